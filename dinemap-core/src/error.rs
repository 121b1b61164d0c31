//! Error types and result types for directory store operations.
//!
//! This module provides the error taxonomy for every operation the directory
//! exposes. Use [`StoreResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with the directory store.
///
/// Not-found conditions on *reads* are represented as absent values
/// (`Ok(None)` / empty vectors), never as errors; [`StoreError::NotFound`] is
/// reserved for writes that require an existing target and for the proximity
/// pivot lookup.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A document with the given ID already exists in the collection.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The targeted document does not exist. The first argument is the
    /// document ID, the second is the collection name.
    #[error("Document {0} not found in collection {1}")]
    NotFound(String, String),
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// A caller-supplied argument is out of contract (e.g. a zero page size).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Transport or connection failure in the underlying store. Not
    /// recoverable locally; the caller owns retry and backoff.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// A transaction session operation failed or was misused.
    #[error("Transaction error: {0}")]
    Transaction(String),
    /// An error occurred during schema migration.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// A specialized `Result` type for directory store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
