//! Core trait and serialization utilities for stored documents.
//!
//! Every entity persisted by a backend implements [`Document`]: a unique
//! identifier plus the name of the collection it lives in. [`DocumentExt`]
//! adds BSON/JSON conversion on top and is blanket-implemented.

use bson::{Bson, Uuid, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::StoreResult;

/// Trait implemented by every entity a backend persists.
///
/// # Example
///
/// ```ignore
/// use dinemap_core::document::Document;
/// use bson::Uuid;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct Restaurant {
///     pub id: Uuid,
///     pub name: String,
///     // ...
/// }
///
/// impl Document for Restaurant {
///     fn id(&self) -> &Uuid {
///         &self.id
///     }
///
///     fn collection_name() -> &'static str {
///         "restaurants"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns a reference to this document's unique identifier.
    fn id(&self) -> &Uuid;

    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Extension trait providing serialization/deserialization utilities for documents.
///
/// Automatically implemented for all [`Document`] types. The BSON forms are
/// what backends store; the JSON forms are for handing detached snapshots to
/// the API layer.
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    fn to_bson(&self) -> StoreResult<Bson>;

    /// Creates a document from a BSON value.
    fn from_bson(bson: Bson) -> StoreResult<Self>;

    /// Converts this document to a JSON value.
    fn to_json(&self) -> StoreResult<Value>;

    /// Creates a document from a JSON value.
    fn from_json(value: Value) -> StoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> StoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> StoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }

    fn to_json(&self) -> StoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> StoreResult<Self> {
        Ok(from_value(value)?)
    }
}
