//! In-memory storage implementation for document stores.
//!
//! Documents live in per-collection vectors behind an async read-write lock, so natural
//! order is insertion order, the same order MongoDB reports for an unsorted collection scan.

use std::{collections::HashMap, sync::Arc, cmp::Ordering};
use async_trait::async_trait;
use mea::rwlock::RwLock;
use bson::{Bson, Document, oid::ObjectId};

use crudtour_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::ID_FIELD,
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, Query, SortDirection},
    update::{DeleteOutcome, Update, UpdateOutcome},
};

use crate::{evaluator::{Comparable, DocumentEvaluator}, updater::apply_update};

type StoreMap = HashMap<String, Vec<Document>>;


/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable; clones share the same underlying data. Queries scan every
/// document in a collection, which is fine for tests and demos.
///
/// # Example
///
/// ```ignore
/// use crudtour_memory::InMemoryStore;
/// use crudtour::{backend::StoreBackend, query::Filter};
/// use bson::doc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     let id = store.insert_one(doc! { "someInteger": 12 }, "mongo").await?;
///     let found = store.find_one(Filter::id(id), "mongo").await?;
///     assert!(found.is_some());
///
///     Ok(())
/// }
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> documents in insertion order
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
        }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Moves `_id` to the front of the document, generating one when absent.
    fn prepare_document(document: Document) -> DocumentStoreResult<(ObjectId, Document)> {
        let id = match document.get(ID_FIELD) {
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => return Err(DocumentStoreError::InvalidDocument(format!("Expected an ObjectId for _id, got {other}"))),
            None => ObjectId::new(),
        };

        let mut prepared = Document::new();
        prepared.insert(ID_FIELD, id);

        for (key, value) in document {
            if key != ID_FIELD {
                prepared.insert(key, value);
            }
        }

        Ok((id, prepared))
    }

    fn contains_id(documents: &[Document], id: &ObjectId) -> bool {
        documents
            .iter()
            .any(|doc| doc.get_object_id(ID_FIELD).is_ok_and(|existing| existing == *id))
    }

    /// Returns the positions of matching documents, at most `limit` of them.
    fn matching_positions(documents: &[Document], filter: &Expr, limit: Option<usize>) -> DocumentStoreResult<Vec<usize>> {
        let mut positions = Vec::new();

        for (position, doc) in documents.iter().enumerate() {
            if limit.is_some_and(|limit| positions.len() >= limit) {
                break;
            }
            if DocumentEvaluator::matches(doc, Some(filter))? {
                positions.push(position);
            }
        }

        Ok(positions)
    }

    async fn update_matching(&self, filter: Expr, update: Update, collection: &str, limit: Option<usize>) -> DocumentStoreResult<UpdateOutcome> {
        update.validate()?;

        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(UpdateOutcome::default());
        };

        let mut outcome = UpdateOutcome::default();

        for position in Self::matching_positions(documents, &filter, limit)? {
            outcome.matched += 1;

            if apply_update(&mut documents[position], &update)? {
                outcome.modified += 1;
            }
        }

        tracing::debug!(collection, matched = outcome.matched, modified = outcome.modified, "updated documents");

        Ok(outcome)
    }

    async fn delete_matching(&self, filter: Expr, collection: &str, limit: Option<usize>) -> DocumentStoreResult<DeleteOutcome> {
        let mut store = self.store.write().await;
        let Some(documents) = store.get_mut(collection) else {
            return Ok(DeleteOutcome::default());
        };

        let positions = Self::matching_positions(documents, &filter, limit)?;

        // Remove from the back so earlier positions stay valid.
        for position in positions.iter().rev() {
            documents.remove(*position);
        }

        tracing::debug!(collection, deleted = positions.len(), "deleted documents");

        Ok(DeleteOutcome { deleted: positions.len() as u64 })
    }
}


#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_one(&self, document: Document, collection: &str) -> DocumentStoreResult<ObjectId> {
        let (id, document) = Self::prepare_document(document)?;

        let mut store = self.store.write().await;
        let documents = store
            .entry(collection.to_string())
            .or_default();

        if Self::contains_id(documents, &id) {
            return Err(DocumentStoreError::DocumentAlreadyExists(id.to_hex(), collection.to_string()));
        }

        documents.push(document);
        tracing::debug!(collection, %id, "inserted document");

        Ok(id)
    }

    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> DocumentStoreResult<Vec<ObjectId>> {
        let prepared = documents
            .into_iter()
            .map(Self::prepare_document)
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        let mut store = self.store.write().await;

        // Check the whole batch before touching the collection.
        for (index, (id, _)) in prepared.iter().enumerate() {
            let stored = store
                .get(collection)
                .is_some_and(|existing| Self::contains_id(existing, id));

            if stored || prepared[..index].iter().any(|(other, _)| other == id) {
                return Err(DocumentStoreError::DocumentAlreadyExists(id.to_hex(), collection.to_string()));
            }
        }

        let existing = store
            .entry(collection.to_string())
            .or_default();
        let mut ids = Vec::with_capacity(prepared.len());

        for (id, document) in prepared {
            existing.push(document);
            ids.push(id);
        }

        tracing::debug!(collection, count = ids.len(), "inserted documents");

        Ok(ids)
    }

    async fn find_one(&self, filter: Expr, collection: &str) -> DocumentStoreResult<Option<Document>> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(None);
        };

        for doc in documents {
            if DocumentEvaluator::matches(doc, Some(&filter))? {
                return Ok(Some(doc.clone()));
            }
        }

        Ok(None)
    }

    async fn find(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut found = Vec::new();

        for doc in documents {
            if DocumentEvaluator::matches(doc, query.filter.as_ref())? {
                found.push(doc.clone());
            }
        }

        if let Some(sort) = &query.sort {
            // Stable sort, so ties keep natural order.
            found.sort_by(|a, b| {
                let left = a
                    .get(&sort.field)
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);
                let right = b
                    .get(&sort.field)
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);

                match sort.direction {
                    SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                    SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
                }
            });
        }

        Ok(
            found
                .into_iter()
                .skip(query.offset.unwrap_or(0))
                .take(query.limit.unwrap_or(usize::MAX))
                .collect()
        )
    }

    async fn update_one(&self, filter: Expr, update: Update, collection: &str) -> DocumentStoreResult<UpdateOutcome> {
        self.update_matching(filter, update, collection, Some(1)).await
    }

    async fn update_many(&self, filter: Expr, update: Update, collection: &str) -> DocumentStoreResult<UpdateOutcome> {
        self.update_matching(filter, update, collection, None).await
    }

    async fn delete_one(&self, filter: Expr, collection: &str) -> DocumentStoreResult<DeleteOutcome> {
        self.delete_matching(filter, collection, Some(1)).await
    }

    async fn delete_many(&self, filter: Expr, collection: &str) -> DocumentStoreResult<DeleteOutcome> {
        self.delete_matching(filter, collection, None).await
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> DocumentStoreResult<u64> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(0);
        };

        let mut count = 0;

        for doc in documents {
            if DocumentEvaluator::matches(doc, filter.as_ref())? {
                count += 1;
            }
        }

        Ok(count)
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .remove(name);

        tracing::debug!(collection = name, "dropped collection");

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        Ok(
            self.store
                .read()
                .await
                .keys()
                .cloned()
                .collect()
        )
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        Ok(())
    }
}


/// Builder for constructing [`InMemoryStore`] instances.
///
/// ```ignore
/// use crudtour_memory::InMemoryStore;
/// use crudtour::backend::StoreBackendBuilder;
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryStore::builder().build().await.unwrap();
/// }
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use crudtour_core::query::Filter;

    const COLLECTION: &str = "mongo";

    #[tokio::test]
    async fn insert_one_assigns_id_first() {
        let store = InMemoryStore::new();

        let id = store.insert_one(doc! { "someInteger": 12 }, COLLECTION).await.unwrap();
        let found = store.find_one(Filter::id(id), COLLECTION).await.unwrap().unwrap();

        assert_eq!(found, doc! { "_id": id, "someInteger": 12 });
        assert_eq!(found.keys().next().map(String::as_str), Some("_id"));
    }

    #[tokio::test]
    async fn insert_one_keeps_given_id_and_rejects_duplicates() {
        let store = InMemoryStore::new();
        let id = ObjectId::new();

        assert_eq!(store.insert_one(doc! { "_id": id }, COLLECTION).await.unwrap(), id);
        assert!(matches!(
            store.insert_one(doc! { "_id": id }, COLLECTION).await,
            Err(DocumentStoreError::DocumentAlreadyExists(_, _)),
        ));
    }

    #[tokio::test]
    async fn insert_many_is_all_or_nothing() {
        let store = InMemoryStore::new();
        let id = ObjectId::new();

        let result = store
            .insert_many(vec![doc! { "n": 1 }, doc! { "_id": id }, doc! { "_id": id }], COLLECTION)
            .await;

        assert!(result.is_err());
        assert_eq!(store.count_documents(None, COLLECTION).await.unwrap(), 0);

        let ids = store.insert_many(vec![doc! { "n": 1 }, doc! { "n": 2 }], COLLECTION).await.unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn find_preserves_insertion_order_and_applies_query_options() {
        let store = InMemoryStore::new();
        store
            .insert_many(vec![doc! { "n": 3 }, doc! { "n": 1 }, doc! { "n": 2 }], COLLECTION)
            .await
            .unwrap();

        let natural = store.find(Query::new(), COLLECTION).await.unwrap();
        assert_eq!(natural.iter().map(|d| d.get_i32("n").unwrap()).collect::<Vec<_>>(), vec![3, 1, 2]);

        let sorted = store
            .find(Query::builder().sort("n", SortDirection::Desc).offset(1).limit(1).build(), COLLECTION)
            .await
            .unwrap();
        assert_eq!(sorted.iter().map(|d| d.get_i32("n").unwrap()).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn update_one_touches_only_first_match() {
        let store = InMemoryStore::new();
        store
            .insert_many(vec![doc! { "n": 1 }, doc! { "n": 1 }], COLLECTION)
            .await
            .unwrap();

        let outcome = store
            .update_one(Filter::eq("n", 1), Update::new().set("n", 5), COLLECTION)
            .await
            .unwrap();

        assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });
        assert_eq!(store.count_documents(Some(Filter::eq("n", 5)), COLLECTION).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_many_counts_only_real_changes() {
        let store = InMemoryStore::new();
        store
            .insert_many(vec![doc! { "n": 60 }, doc! { "n": 253 }, doc! { "n": 12 }], COLLECTION)
            .await
            .unwrap();

        let outcome = store
            .update_many(Filter::gte("n", 60), Update::new().set("n", 60), COLLECTION)
            .await
            .unwrap();

        assert_eq!(outcome, UpdateOutcome { matched: 2, modified: 1 });
    }

    #[tokio::test]
    async fn update_rejects_id_changes() {
        let store = InMemoryStore::new();
        let id = store.insert_one(doc! { "n": 1 }, COLLECTION).await.unwrap();

        let result = store
            .update_one(Filter::id(id), Update::new().set("_id", ObjectId::new()), COLLECTION)
            .await;

        assert!(matches!(result, Err(DocumentStoreError::InvalidDocument(_))));
    }

    #[tokio::test]
    async fn missing_collection_behaves_as_empty() {
        let store = InMemoryStore::new();

        assert!(store.find(Query::new(), COLLECTION).await.unwrap().is_empty());
        assert_eq!(store.find_one(Filter::eq("n", 1), COLLECTION).await.unwrap(), None);
        assert_eq!(
            store.update_many(Filter::eq("n", 1), Update::new().set("n", 2), COLLECTION).await.unwrap(),
            UpdateOutcome::default(),
        );
        assert_eq!(store.delete_one(Filter::eq("n", 1), COLLECTION).await.unwrap(), DeleteOutcome::default());
        store.drop_collection(COLLECTION).await.unwrap();
    }

    #[tokio::test]
    async fn delete_one_and_many() {
        let store = InMemoryStore::new();
        store
            .insert_many(vec![doc! { "n": 1 }, doc! { "n": 1 }, doc! { "n": 1 }, doc! { "n": 2 }], COLLECTION)
            .await
            .unwrap();

        assert_eq!(store.delete_one(Filter::eq("n", 1), COLLECTION).await.unwrap().deleted, 1);
        assert_eq!(store.delete_many(Filter::eq("n", 1), COLLECTION).await.unwrap().deleted, 2);
        assert_eq!(store.count_documents(None, COLLECTION).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn drop_collection_removes_it() {
        let store = InMemoryStore::builder().build().await.unwrap();
        store.insert_one(doc! { "n": 1 }, COLLECTION).await.unwrap();

        assert_eq!(store.list_collections().await.unwrap(), vec![COLLECTION.to_string()]);

        store.drop_collection(COLLECTION).await.unwrap();

        assert!(store.list_collections().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn overflowing_inc_fails_and_keeps_the_document() {
        let store = InMemoryStore::new();
        let id = store.insert_one(doc! { "n": i64::MAX }, COLLECTION).await.unwrap();

        assert!(matches!(
            store.update_one(Filter::id(id), Update::new().inc("n", 1_i64), COLLECTION).await,
            Err(DocumentStoreError::InvalidDocument(_)),
        ));
        assert_eq!(
            store.find_one(Filter::id(id), COLLECTION).await.unwrap(),
            Some(doc! { "_id": id, "n": i64::MAX }),
        );
    }

    #[tokio::test]
    async fn integers_beyond_double_precision_filter_exactly() {
        let store = InMemoryStore::new();
        store.insert_one(doc! { "n": 9_007_199_254_740_993_i64 }, COLLECTION).await.unwrap();

        assert_eq!(store.count_documents(Some(Filter::eq("n", 9_007_199_254_740_992_i64)), COLLECTION).await.unwrap(), 0);
        assert_eq!(store.count_documents(Some(Filter::lt("n", 9_007_199_254_740_993_i64)), COLLECTION).await.unwrap(), 0);
        assert_eq!(store.count_documents(Some(Filter::gt("n", 9_007_199_254_740_992_i64)), COLLECTION).await.unwrap(), 1);
    }
}
