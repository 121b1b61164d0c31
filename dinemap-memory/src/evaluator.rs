//! Query evaluation and update application for in-memory documents.
//!
//! This module is the in-memory counterpart of a store's query engine: it
//! decides whether a BSON document matches a filter expression and applies
//! update descriptors directly to document fields.

use std::cmp::Ordering;

use bson::{Bson, Document};

use dinemap_core::{
    error::{StoreError, StoreResult},
    query::{Expr, FieldOp, QueryVisitor},
    update::{Update, UpdateOp},
};

/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so Int32/Int64/Double compare across
/// representations, matching store-native comparison semantics. Binary values
/// (document identities) order bytewise, which keeps the identity sort
/// deterministic.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    String(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Binary(binary) => Comparable::Bytes(&binary.bytes),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Bytes(a), Comparable::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            (Comparable::Bytes(a), Comparable::Bytes(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Bson,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Bson) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> StoreResult<bool> {
        self.visit_expr(expr)
    }

    fn fields(&self) -> StoreResult<&'a Document> {
        self.document
            .as_document()
            .ok_or_else(|| StoreError::Serialization("expected a BSON document".to_string()))
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = StoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.fields()?.get(field).is_some() == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.fields()?.get(field) else {
            return Ok(false);
        };

        match op {
            FieldOp::Eq => Ok(Comparable::from(field_value) == Comparable::from(value)),
            FieldOp::Gte | FieldOp::Lte => {
                match Comparable::from(field_value).partial_cmp(&Comparable::from(value)) {
                    Some(ordering) => Ok(match op {
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lte => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    }),
                    None => Ok(false),
                }
            }
            FieldOp::MatchesCi => match (Comparable::from(field_value), Comparable::from(value)) {
                (Comparable::String(haystack), Comparable::String(pattern)) => Ok(haystack
                    .to_lowercase()
                    .contains(&pattern.to_lowercase())),
                _ => Ok(false),
            },
            FieldOp::In => match value {
                Bson::Array(values) => Ok(values
                    .iter()
                    .any(|candidate| Comparable::from(field_value) == Comparable::from(candidate))),
                _ => Err(StoreError::InvalidArgument(
                    "In operator requires an array of values".to_string(),
                )),
            },
        }
    }
}

/// Filters documents, keeping those the expression matches. Documents the
/// evaluator cannot interpret are dropped rather than failing the scan.
pub(crate) fn filter_documents<'a>(
    documents: impl IntoIterator<Item = &'a Bson>,
    expr: &Expr,
) -> Vec<Bson> {
    documents
        .into_iter()
        .filter(|doc| {
            DocumentEvaluator::new(doc)
                .evaluate(expr)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Applies an update descriptor to a document in place.
///
/// Increments never clamp: a negative delta can drive a counter below zero,
/// exactly as the store-native `$inc` would.
pub(crate) fn apply_update(fields: &mut Document, update: &Update) -> StoreResult<()> {
    for op in &update.ops {
        match op {
            UpdateOp::Inc(field, delta) => {
                let incremented = match fields.get(field) {
                    None => Bson::Int64(*delta),
                    Some(Bson::Int32(value)) => Bson::Int64(*value as i64 + delta),
                    Some(Bson::Int64(value)) => Bson::Int64(value + delta),
                    Some(Bson::Double(value)) => Bson::Double(value + *delta as f64),
                    Some(_) => {
                        return Err(StoreError::InvalidArgument(format!(
                            "cannot increment non-numeric field '{field}'"
                        )));
                    }
                };
                fields.insert(field.clone(), incremented);
            }
            UpdateOp::Set(field, value) => {
                fields.insert(field.clone(), value.clone());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use dinemap_core::query::Filter;

    fn matches(doc: &Bson, expr: &Expr) -> bool {
        DocumentEvaluator::new(doc).evaluate(expr).unwrap()
    }

    #[test]
    fn pattern_match_is_case_insensitive_substring() {
        let doc = Bson::Document(doc! { "cuisine": "Italian" });

        assert!(matches(&doc, &Filter::matches_ci("cuisine", "ital")));
        assert!(matches(&doc, &Filter::matches_ci("cuisine", "LIAN")));
        assert!(matches(&doc, &Filter::matches_ci("cuisine", "")));
        assert!(!matches(&doc, &Filter::matches_ci("cuisine", "french")));
    }

    #[test]
    fn range_bounds_compare_across_numeric_types() {
        let doc = Bson::Document(doc! { "minPrice": 20_i64, "maxPrice": 50_i32 });

        let expr = Filter::gte("minPrice", 10_i64).and(Filter::lte("maxPrice", 60_i64));
        assert!(matches(&doc, &expr));

        assert!(!matches(&doc, &Filter::gte("minPrice", 25_i64)));
    }

    #[test]
    fn missing_field_fails_predicates_but_satisfies_not_exists() {
        let doc = Bson::Document(doc! { "name": "Mingles" });

        assert!(!matches(&doc, &Filter::eq("country", "KR")));
        assert!(matches(&doc, &Filter::not_exists("bookmarkCount")));
        assert!(!matches(&doc, &Filter::exists("bookmarkCount")));
    }

    #[test]
    fn increment_creates_missing_field_and_goes_negative() {
        let mut fields = doc! { "name": "Mingles" };

        apply_update(&mut fields, &Update::inc("bookmarkCount", 1)).unwrap();
        assert_eq!(fields.get("bookmarkCount"), Some(&Bson::Int64(1)));

        apply_update(&mut fields, &Update::inc("bookmarkCount", -2)).unwrap();
        assert_eq!(fields.get("bookmarkCount"), Some(&Bson::Int64(-1)));
    }
}
