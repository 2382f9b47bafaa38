//! Update descriptions applied to matched documents.
//!
//! An [`Update`] is an ordered list of field operators. Backends either translate it
//! (`$set`, `$unset`, `$inc`) or apply it in place.
//!
//! ```ignore
//! use crudtour::update::Update;
//!
//! let update = Update::new().set("someInteger", 201).unset("legacy");
//! ```

use bson::Bson;

use crate::{
    document::ID_FIELD,
    error::{DocumentStoreError, DocumentStoreResult},
};

/// A single field operator.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Sets the field to the value, creating it if missing.
    Set(String, Bson),
    /// Removes the field.
    Unset(String),
    /// Adds the numeric value to the field, treating a missing field as zero.
    Inc(String, Bson),
}

impl UpdateOp {
    /// Returns the field this operator touches.
    pub fn field(&self) -> &str {
        match self {
            UpdateOp::Set(field, _) | UpdateOp::Unset(field) | UpdateOp::Inc(field, _) => field,
        }
    }
}

/// An ordered set of field operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    /// Creates an empty update.
    pub fn new() -> Self {
        Update::default()
    }

    /// Sets `field` to `value`.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.ops.push(UpdateOp::Set(field.into(), value.into()));
        self
    }

    /// Removes `field`.
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.ops.push(UpdateOp::Unset(field.into()));
        self
    }

    /// Increments `field` by `amount`.
    pub fn inc(mut self, field: impl Into<String>, amount: impl Into<Bson>) -> Self {
        self.ops.push(UpdateOp::Inc(field.into(), amount.into()));
        self
    }

    /// Returns the operators in the order they were added.
    pub fn ops(&self) -> &[UpdateOp] {
        &self.ops
    }

    /// Checks that the update is non-empty and leaves `_id` alone.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidDocument`] when the update is empty,
    /// targets `_id`, or increments by a non-numeric amount.
    pub fn validate(&self) -> DocumentStoreResult<()> {
        if self.ops.is_empty() {
            return Err(DocumentStoreError::InvalidDocument("Update must contain at least one operator".to_string()));
        }

        for op in &self.ops {
            if op.field() == ID_FIELD {
                return Err(DocumentStoreError::InvalidDocument("The _id field is immutable".to_string()));
            }

            if let UpdateOp::Inc(field, amount) = op {
                if !matches!(amount, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_)) {
                    return Err(DocumentStoreError::InvalidDocument(format!("Cannot increment {field} by a non-numeric value")));
                }
            }
        }

        Ok(())
    }
}

/// Result of an update operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of documents the filter matched.
    pub matched: u64,
    /// Number of documents whose content actually changed.
    pub modified: u64,
}

/// Result of a delete operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Number of documents removed.
    pub deleted: u64,
}
