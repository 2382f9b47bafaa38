use async_trait::async_trait;
use futures::TryStreamExt;
use bson::{Bson, Document, doc, oid::ObjectId};
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use crudtour_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::ID_FIELD,
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, Query, SortDirection},
    update::{DeleteOutcome, Update, UpdateOutcome},
};

use crate::query::{MongoQueryTranslator, translate_update};


#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    /// Rejects a document whose `_id` is present but not an `ObjectId`, before it is sent.
    fn check_id(document: &Document) -> DocumentStoreResult<()> {
        match document.get(ID_FIELD) {
            None | Some(Bson::ObjectId(_)) => Ok(()),
            Some(other) => Err(DocumentStoreError::InvalidDocument(format!("Expected an ObjectId for _id, got {other}"))),
        }
    }

    fn find_options(query: &Query) -> DocumentStoreResult<FindOptions> {
        let mut options = FindOptions::default();

        if let Some(limit) = query.limit {
            options.limit = Some(
                i64::try_from(limit)
                    .map_err(|_| DocumentStoreError::Backend(format!("Query limit {limit} is out of range")))?,
            );
        }
        if let Some(skip) = query.offset {
            options.skip = Some(
                u64::try_from(skip)
                    .map_err(|_| DocumentStoreError::Backend(format!("Query offset {skip} is out of range")))?,
            );
        }
        if let Some(sort) = &query.sort {
            options.sort = Some(doc! {
                sort.field.clone(): match sort.direction {
                    SortDirection::Asc => 1,
                    SortDirection::Desc => -1,
                }
            })
        }

        Ok(options)
    }

    fn inserted_id(id: Bson) -> DocumentStoreResult<ObjectId> {
        match id {
            Bson::ObjectId(id) => Ok(id),
            other => Err(DocumentStoreError::InvalidDocument(format!("Expected an ObjectId for _id, got {other}"))),
        }
    }

    fn prepare_update(update: &Update) -> DocumentStoreResult<Document> {
        update.validate()?;

        Ok(translate_update(update))
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn insert_one(&self, document: Document, collection: &str) -> DocumentStoreResult<ObjectId> {
        Self::check_id(&document)?;

        let id = Self::inserted_id(
            self.get_collection(collection)
                .insert_one(document)
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .inserted_id,
        )?;

        tracing::debug!(collection, %id, "inserted document");

        Ok(id)
    }

    async fn insert_many(&self, documents: Vec<Document>, collection: &str) -> DocumentStoreResult<Vec<ObjectId>> {
        documents
            .iter()
            .try_for_each(Self::check_id)?;

        let mut inserted = self.get_collection(collection)
            .insert_many(documents)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
            .inserted_ids
            .into_iter()
            .collect::<Vec<(usize, Bson)>>();

        // The driver reports ids keyed by input position, in no particular order.
        inserted.sort_by_key(|(index, _)| *index);

        let ids = inserted
            .into_iter()
            .map(|(_, id)| Self::inserted_id(id))
            .collect::<DocumentStoreResult<Vec<ObjectId>>>()?;

        tracing::debug!(collection, count = ids.len(), "inserted documents");

        Ok(ids)
    }

    async fn find_one(&self, filter: Expr, collection: &str) -> DocumentStoreResult<Option<Document>> {
        self.get_collection(collection)
            .find_one(MongoQueryTranslator::filter(Some(&filter))?)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn find(&self, query: Query, collection: &str) -> DocumentStoreResult<Vec<Document>> {
        let options = Self::find_options(&query)?;

        self.get_collection(collection)
            .find(MongoQueryTranslator::filter(query.filter.as_ref())?)
            .with_options(options)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn update_one(&self, filter: Expr, update: Update, collection: &str) -> DocumentStoreResult<UpdateOutcome> {
        let result = self.get_collection(collection)
            .update_one(
                MongoQueryTranslator::filter(Some(&filter))?,
                Self::prepare_update(&update)?,
            )
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn update_many(&self, filter: Expr, update: Update, collection: &str) -> DocumentStoreResult<UpdateOutcome> {
        let result = self.get_collection(collection)
            .update_many(
                MongoQueryTranslator::filter(Some(&filter))?,
                Self::prepare_update(&update)?,
            )
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_one(&self, filter: Expr, collection: &str) -> DocumentStoreResult<DeleteOutcome> {
        Ok(DeleteOutcome {
            deleted: self.get_collection(collection)
                .delete_one(MongoQueryTranslator::filter(Some(&filter))?)
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .deleted_count,
        })
    }

    async fn delete_many(&self, filter: Expr, collection: &str) -> DocumentStoreResult<DeleteOutcome> {
        Ok(DeleteOutcome {
            deleted: self.get_collection(collection)
                .delete_many(MongoQueryTranslator::filter(Some(&filter))?)
                .await
                .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
                .deleted_count,
        })
    }

    async fn count_documents(&self, filter: Option<Expr>, collection: &str) -> DocumentStoreResult<u64> {
        self.get_collection(collection)
            .count_documents(MongoQueryTranslator::filter(filter.as_ref())?)
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.get_collection(name)
            .drop()
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?;

        tracing::debug!(collection = name, "dropped collection");

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.client
            .database(&self.database)
            .list_collection_names()
            .await
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        self.shutdown().await
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    /// Connects and pings the server, so an unreachable server fails here rather than
    /// on the first operation.
    #[tracing::instrument(skip(self), fields(database = %self.database))]
    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        tracing::debug!("connecting to MongoDB");

        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;

        let client = Client::with_options(options)
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;

        tracing::debug!("connected to MongoDB");

        Ok(MongoDbStore::new(client, self.database))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_other_than_object_ids_are_rejected_before_insert() {
        assert!(MongoDbStore::check_id(&doc! { "n": 1 }).is_ok());
        assert!(MongoDbStore::check_id(&doc! { "_id": ObjectId::new() }).is_ok());
        assert!(matches!(
            MongoDbStore::check_id(&doc! { "_id": "x" }),
            Err(DocumentStoreError::InvalidDocument(_)),
        ));
    }

    #[test]
    fn find_options_carry_limit_offset_and_sort() {
        let query = Query::builder()
            .limit(2)
            .offset(1)
            .sort("someInteger", SortDirection::Desc)
            .build();
        let options = MongoDbStore::find_options(&query).unwrap();

        assert_eq!(options.limit, Some(2));
        assert_eq!(options.skip, Some(1));
        assert_eq!(options.sort, Some(doc! { "someInteger": -1 }));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn out_of_range_limit_is_an_error() {
        let query = Query::builder()
            .limit(usize::MAX)
            .build();

        assert!(matches!(
            MongoDbStore::find_options(&query),
            Err(DocumentStoreError::Backend(_)),
        ));
    }
}
