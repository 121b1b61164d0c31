//! Update descriptors for the directory's field mutations.
//!
//! The directory mutates stored documents in exactly two ways: atomic
//! increments of the bookmark counter and setting a default during the
//! counter backfill. An [`Update`] is an ordered list of those operations,
//! translated by each backend (`$inc`/`$set` on MongoDB, direct document
//! edits in memory).

use bson::Bson;

/// A single field mutation.
#[derive(Debug, Clone)]
pub enum UpdateOp {
    /// Atomically adds the delta to a numeric field. A missing field is
    /// created with the delta as its value. No floor or ceiling is applied.
    Inc(String, i64),
    /// Sets a field to the given value, creating it if absent.
    Set(String, Bson),
}

/// An ordered set of field mutations applied to every matched document.
#[derive(Debug, Clone, Default)]
pub struct Update {
    pub ops: Vec<UpdateOp>,
}

impl Update {
    /// Creates an update that increments `field` by `delta`.
    pub fn inc(field: impl Into<String>, delta: i64) -> Self {
        Self {
            ops: vec![UpdateOp::Inc(field.into(), delta)],
        }
    }

    /// Creates an update that sets `field` to `value`.
    pub fn set(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self {
            ops: vec![UpdateOp::Set(field.into(), value.into())],
        }
    }

    /// Appends another operation to this update.
    pub fn and(mut self, op: UpdateOp) -> Self {
        self.ops.push(op);
        self
    }
}
