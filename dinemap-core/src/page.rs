//! Pagination request and result types.
//!
//! Pages are 1-indexed. The result shape carries the record slice plus the
//! metadata listings render: the last page number, the total match count, and
//! the 1-based display offset of the first record on the page.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Parameters for one page of a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    /// The page number (1-indexed).
    pub page: u64,
    /// Maximum number of records per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Creates new pagination parameters.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self { page, page_size }
    }

    /// Rejects out-of-contract parameters (`page < 1` or `page_size < 1`)
    /// rather than silently coercing them.
    pub fn validate(&self) -> StoreResult<()> {
        if self.page < 1 {
            return Err(StoreError::InvalidArgument(format!(
                "page must be >= 1, got {}",
                self.page
            )));
        }
        if self.page_size < 1 {
            return Err(StoreError::InvalidArgument(format!(
                "page size must be >= 1, got {}",
                self.page_size
            )));
        }

        Ok(())
    }

    /// Number of records to skip to reach this page.
    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.page_size
    }

    /// 1-based display offset of the first record on this page.
    ///
    /// Computed from the request alone; when `page` lies beyond the last
    /// page this exceeds the total count, and callers must tolerate that.
    pub fn display_offset(&self) -> u64 {
        (self.page - 1) * self.page_size + 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: 10 }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The records on this page, at most `page_size` of them.
    pub records: Vec<T>,
    /// The last page number; 0 when nothing matches.
    pub last_page: u64,
    /// Total count of matching records across all pages.
    pub total_count: u64,
    /// 1-based display offset of the first record on this page.
    pub offset: u64,
}

impl<T> Page<T> {
    /// Assembles a page from fetched records and the total match count.
    ///
    /// The request must have been validated; `page_size >= 1` is assumed.
    pub fn assemble(records: Vec<T>, total_count: u64, request: &PageRequest) -> Self {
        Self {
            records,
            last_page: total_count.div_ceil(request.page_size),
            total_count,
            offset: request.display_offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_offset_is_one_based() {
        assert_eq!(PageRequest::new(1, 10).display_offset(), 1);
        assert_eq!(PageRequest::new(3, 20).display_offset(), 41);
        assert_eq!(PageRequest::new(3, 20).skip(), 40);
    }

    #[test]
    fn last_page_is_ceiling_of_count_over_size() {
        let request = PageRequest::new(1, 10);

        assert_eq!(Page::<()>::assemble(vec![], 0, &request).last_page, 0);
        assert_eq!(Page::<()>::assemble(vec![], 1, &request).last_page, 1);
        assert_eq!(Page::<()>::assemble(vec![], 10, &request).last_page, 1);
        assert_eq!(Page::<()>::assemble(vec![], 11, &request).last_page, 2);
    }

    #[test]
    fn offset_is_computed_even_past_the_last_page() {
        let request = PageRequest::new(9, 10);
        let page = Page::<()>::assemble(vec![], 3, &request);

        assert_eq!(page.last_page, 1);
        assert_eq!(page.offset, 81);
        assert!(page.records.is_empty());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(PageRequest::new(1, 0).validate().is_err());
        assert!(PageRequest::new(0, 10).validate().is_err());
        assert!(PageRequest::new(1, 1).validate().is_ok());
    }
}
