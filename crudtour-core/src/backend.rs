//! Storage backend abstraction for the document store.
//!
//! The [`StoreBackend`] trait is the seam between the typed collection API and a concrete
//! store. Every operation mirrors a MongoDB collection call, so the MongoDB backend is a
//! thin translation layer and the in-memory backend reproduces the same semantics for
//! tests and local runs.
//!
//! # Examples
//!
//! ```ignore
//! use crudtour::backend::StoreBackend;
//! use crudtour::query::Filter;
//! use bson::doc;
//!
//! let id = backend.insert_one(doc! { "someString": "Example String" }, "mongo").await?;
//! let found = backend.find_one(Filter::id(id), "mongo").await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use std::fmt::Debug;

use crate::{
    error::DocumentStoreResult,
    query::{Expr, Query},
    update::{DeleteOutcome, Update, UpdateOutcome},
};

/// Abstract interface for document storage backends.
///
/// Implementations must be `Send + Sync`; all methods are async and return
/// [`DocumentStoreResult`]. A collection that does not exist behaves as an empty one:
/// reads return nothing, updates and deletes report zero documents, and inserts create it.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts a single document and returns its identifier.
    ///
    /// If the document has no `_id`, one is generated.
    async fn insert_one(&self, document: Document, collection: &str) -> DocumentStoreResult<ObjectId>;

    /// Inserts several documents in one call and returns their identifiers in input order.
    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> DocumentStoreResult<Vec<ObjectId>>;

    /// Returns the first document matching `filter` in natural order, if any.
    async fn find_one(&self, filter: Expr, collection: &str) -> DocumentStoreResult<Option<Document>>;

    /// Returns every document selected by `query`.
    async fn find(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Document>>;

    /// Applies `update` to the first document matching `filter`.
    async fn update_one(&self, filter: Expr, update: Update, collection: &str) -> DocumentStoreResult<UpdateOutcome>;

    /// Applies `update` to every document matching `filter`.
    async fn update_many(&self, filter: Expr, update: Update, collection: &str) -> DocumentStoreResult<UpdateOutcome>;

    /// Removes the first document matching `filter`.
    async fn delete_one(&self, filter: Expr, collection: &str) -> DocumentStoreResult<DeleteOutcome>;

    /// Removes every document matching `filter`.
    async fn delete_many(&self, filter: Expr, collection: &str) -> DocumentStoreResult<DeleteOutcome>;

    /// Counts documents matching `filter`, or all documents when `None`.
    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> DocumentStoreResult<u64>;

    /// Drops a collection. Dropping a collection that does not exist succeeds.
    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Lists the collections currently holding data.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Releases the connection and any background resources.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized;
}

/// Factory trait for asynchronously constructing backend instances.
#[async_trait]
pub trait StoreBackendBuilder: Send + Sync {
    /// The backend type this builder produces.
    type Backend: StoreBackend;

    /// Builds the backend, connecting to the underlying store if needed.
    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
