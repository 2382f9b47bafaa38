//! Collection handles for document store operations.
//!
//! - [`Collection`] - Untyped collection working with raw BSON documents
//! - [`TypedCollection`] - Collection that encodes and decodes a specific document type
//!
//! # Example
//!
//! ```ignore
//! use crudtour::{query::Filter, update::Update};
//!
//! # async fn example(store: &crudtour::store::DocumentStore<impl crudtour::backend::StoreBackend>) -> crudtour::error::DocumentStoreResult<()> {
//! let examples = store.typed_collection::<ExampleDocument>("mongo");
//! let id = examples.insert_one(&ExampleDocument::first()).await?;
//! examples.update_by_id(id, Update::new().set("someInteger", 201)).await?;
//! # Ok(()) }
//! ```

use bson::{Document as BsonDocument, oid::ObjectId};
use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    document::{Document, DocumentExt},
    error::DocumentStoreResult,
    query::{Expr, Filter, Query},
    update::{DeleteOutcome, Update, UpdateOutcome},
};

/// An untyped collection with a reference to a storage backend.
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a single document and returns its identifier.
    pub async fn insert_one(&self, document: BsonDocument) -> DocumentStoreResult<ObjectId> {
        self.backend
            .insert_one(document, self.name())
            .await
    }

    /// Inserts documents in one call and returns their identifiers in input order.
    pub async fn insert_many(&self, documents: Vec<BsonDocument>) -> DocumentStoreResult<Vec<ObjectId>> {
        self.backend
            .insert_many(documents, self.name())
            .await
    }

    /// Returns the first document matching the filter.
    pub async fn find_one(&self, filter: Expr) -> DocumentStoreResult<Option<BsonDocument>> {
        self.backend
            .find_one(filter, self.name())
            .await
    }

    /// Returns the documents selected by the query.
    pub async fn find(&self, query: Query) -> DocumentStoreResult<Vec<BsonDocument>> {
        self.backend
            .find(query, self.name())
            .await
    }

    /// Applies the update to the first document matching the filter.
    pub async fn update_one(&self, filter: Expr, update: Update) -> DocumentStoreResult<UpdateOutcome> {
        self.backend
            .update_one(filter, update, self.name())
            .await
    }

    /// Applies the update to every document matching the filter.
    pub async fn update_many(&self, filter: Expr, update: Update) -> DocumentStoreResult<UpdateOutcome> {
        self.backend
            .update_many(filter, update, self.name())
            .await
    }

    /// Removes the first document matching the filter.
    pub async fn delete_one(&self, filter: Expr) -> DocumentStoreResult<DeleteOutcome> {
        self.backend
            .delete_one(filter, self.name())
            .await
    }

    /// Removes every document matching the filter.
    pub async fn delete_many(&self, filter: Expr) -> DocumentStoreResult<DeleteOutcome> {
        self.backend
            .delete_many(filter, self.name())
            .await
    }

    /// Counts documents matching the filter, or all documents when `None`.
    pub async fn count(&self, filter: Option<Expr>) -> DocumentStoreResult<u64> {
        self.backend
            .count_documents(filter, self.name())
            .await
    }

    /// Drops this collection.
    pub async fn drop(&self) -> DocumentStoreResult<()> {
        self.backend
            .drop_collection(self.name())
            .await
    }
}

/// A collection that encodes and decodes documents of type `D`.
///
/// Reads decode every returned document; a document that does not fit `D` surfaces as a
/// [`DocumentStoreError::Serialization`](crate::error::DocumentStoreError::Serialization)
/// rather than being skipped.
#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a document and returns the identifier it was stored under.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if serialization or insertion fails.
    pub async fn insert_one(&self, document: &D) -> DocumentStoreResult<ObjectId> {
        self.backend
            .insert_one(document.to_document()?, self.name())
            .await
    }

    /// Inserts documents in one call and returns their identifiers in input order.
    pub async fn insert_many(&self, documents: &[D]) -> DocumentStoreResult<Vec<ObjectId>> {
        self.backend
            .insert_many(
                documents
                    .iter()
                    .map(DocumentExt::to_document)
                    .collect::<DocumentStoreResult<Vec<BsonDocument>>>()?,
                self.name(),
            )
            .await
    }

    /// Looks up a document by identifier.
    pub async fn find_by_id(&self, id: ObjectId) -> DocumentStoreResult<Option<D>> {
        self.find_one(Filter::id(id)).await
    }

    /// Returns the first document matching the filter, decoded.
    pub async fn find_one(&self, filter: Expr) -> DocumentStoreResult<Option<D>> {
        self.backend
            .find_one(filter, self.name())
            .await?
            .map(D::from_document)
            .transpose()
    }

    /// Returns the documents selected by the query, decoded.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the query or any decode fails.
    pub async fn find(&self, query: Query) -> DocumentStoreResult<Vec<D>> {
        self.backend
            .find(query, self.name())
            .await?
            .into_iter()
            .map(D::from_document)
            .collect()
    }

    /// Returns every document in the collection, decoded.
    pub async fn find_all(&self) -> DocumentStoreResult<Vec<D>> {
        self.find(Query::new()).await
    }

    /// Applies the update to the document with the given identifier.
    pub async fn update_by_id(&self, id: ObjectId, update: Update) -> DocumentStoreResult<UpdateOutcome> {
        self.update_one(Filter::id(id), update).await
    }

    /// Applies the update to the first document matching the filter.
    pub async fn update_one(&self, filter: Expr, update: Update) -> DocumentStoreResult<UpdateOutcome> {
        self.backend
            .update_one(filter, update, self.name())
            .await
    }

    /// Applies the update to every document matching the filter.
    pub async fn update_many(&self, filter: Expr, update: Update) -> DocumentStoreResult<UpdateOutcome> {
        self.backend
            .update_many(filter, update, self.name())
            .await
    }

    /// Removes the document with the given identifier.
    pub async fn delete_by_id(&self, id: ObjectId) -> DocumentStoreResult<DeleteOutcome> {
        self.delete_one(Filter::id(id)).await
    }

    /// Removes the first document matching the filter.
    pub async fn delete_one(&self, filter: Expr) -> DocumentStoreResult<DeleteOutcome> {
        self.backend
            .delete_one(filter, self.name())
            .await
    }

    /// Removes every document matching the filter.
    pub async fn delete_many(&self, filter: Expr) -> DocumentStoreResult<DeleteOutcome> {
        self.backend
            .delete_many(filter, self.name())
            .await
    }

    /// Counts documents matching the filter, or all documents when `None`.
    pub async fn count(&self, filter: Option<Expr>) -> DocumentStoreResult<u64> {
        self.backend
            .count_documents(filter, self.name())
            .await
    }

    /// Drops this collection.
    pub async fn drop(&self) -> DocumentStoreResult<()> {
        self.backend
            .drop_collection(self.name())
            .await
    }
}
