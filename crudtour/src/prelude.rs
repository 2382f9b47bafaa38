//! Convenient re-exports of commonly used types from crudtour.
//!
//! ```ignore
//! use crudtour::prelude::*;
//! ```

pub use crudtour_core::{
    collection::{Collection, TypedCollection},
    store::DocumentStore,
    document::{Document, DocumentExt},
    backend::{StoreBackend, StoreBackendBuilder},
    query::{Query, QueryVisitor, Expr, Sort, SortDirection, FieldOp, QueryBuilder, Filter},
    update::{Update, UpdateOp, UpdateOutcome, DeleteOutcome},
    error::{DocumentStoreError, DocumentStoreResult},
};
