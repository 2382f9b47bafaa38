//! The demo sequence.
//!
//! [`DemoRunner`] walks a collection through a fixed series of CRUD calls and reports each
//! result. Every step is public so the sequence can be driven one call at a time; [`run`]
//! performs all of them in order and always drops the collection afterwards.
//!
//! Any failed step ends the sequence: the error is returned as-is, with no retry.
//!
//! [`run`]: DemoRunner::run

use std::io::Write;
use bson::oid::ObjectId;

use crudtour_core::{
    backend::StoreBackend,
    collection::TypedCollection,
    error::DocumentStoreError,
    query::{Filter, Query},
    store::DocumentStore,
    update::{DeleteOutcome, Update, UpdateOutcome},
};

use crate::{
    config::DemoConfig,
    error::{DemoError, DemoResult},
    report::Report,
    sample::{
        CLAMP_LIMIT, ExampleDocument, QUERY_THRESHOLD, SOME_INTEGER, SOME_STRING,
        UPDATED_INTEGER, UPDATED_STRING,
    },
};


pub struct DemoRunner<'a, B: StoreBackend, W: Write> {
    config: &'a DemoConfig,
    examples: TypedCollection<'a, B, ExampleDocument>,
    report: Report<W>,
    first_id: Option<ObjectId>,
}

impl<'a, B: StoreBackend, W: Write> DemoRunner<'a, B, W> {
    pub fn new(store: &'a DocumentStore<B>, config: &'a DemoConfig, out: W) -> Self {
        Self {
            config,
            examples: store.typed_collection(&config.collection),
            report: Report::new(out),
            first_id: None,
        }
    }

    /// Identifier of the first example document, once inserted.
    pub fn first_id(&self) -> Option<ObjectId> {
        self.first_id
    }

    pub fn into_report(self) -> Report<W> {
        self.report
    }

    fn require_first_id(&self, step: &'static str) -> DemoResult<ObjectId> {
        self.first_id.ok_or(DemoError::FirstDocumentMissing(step))
    }

    /// Inserts the first example document and reports its identifier.
    pub async fn insert_first(&mut self) -> DemoResult<ObjectId> {
        let id = self.examples
            .insert_one(&ExampleDocument::first())
            .await?;

        tracing::info!(%id, "inserted one document");
        self.report.inserted_id(&id)?;
        self.first_id = Some(id);

        Ok(id)
    }

    /// Inserts the two batch documents in a single call and reports their identifiers.
    pub async fn insert_batch(&mut self) -> DemoResult<Vec<ObjectId>> {
        let ids = self.examples
            .insert_many(&ExampleDocument::batch())
            .await?;

        tracing::info!(count = ids.len(), "inserted many documents");
        self.report.inserted_ids(&ids)?;

        Ok(ids)
    }

    /// Looks up the first document by identifier and reports its fields.
    ///
    /// A missing document is an error, as is one that no longer decodes.
    pub async fn show_first(&mut self) -> DemoResult<ExampleDocument> {
        let id = self.require_first_id("show_first")?;
        let document = self.examples
            .find_by_id(id)
            .await?
            .ok_or_else(|| DocumentStoreError::DocumentNotFound(id.to_hex(), self.examples.name().to_string()))?;

        self.report.document(&document)?;

        Ok(document)
    }

    /// Lists the documents whose `someInteger` is below the query threshold.
    pub async fn show_below_threshold(&mut self) -> DemoResult<Vec<ExampleDocument>> {
        let documents = self.examples
            .find(Query::filtered(Filter::lt(SOME_INTEGER, QUERY_THRESHOLD)))
            .await?;

        tracing::info!(count = documents.len(), threshold = QUERY_THRESHOLD, "found documents below threshold");
        self.report.documents(&documents)?;

        Ok(documents)
    }

    /// Sets the first document's `someInteger` by identifier, then shows it again.
    pub async fn update_integer_by_id(&mut self) -> DemoResult<UpdateOutcome> {
        let id = self.require_first_id("update_integer_by_id")?;
        let outcome = self.examples
            .update_by_id(id, Update::new().set(SOME_INTEGER, UPDATED_INTEGER))
            .await?;

        tracing::info!(%id, modified = outcome.modified, "updated document by id");
        self.report.updated(outcome.modified)?;
        self.show_first().await?;

        Ok(outcome)
    }

    /// Sets the first document's `someString` through an `_id` filter, then shows it again.
    pub async fn update_string_by_filter(&mut self) -> DemoResult<UpdateOutcome> {
        let id = self.require_first_id("update_string_by_filter")?;
        let outcome = self.examples
            .update_one(Filter::id(id), Update::new().set(SOME_STRING, UPDATED_STRING))
            .await?;

        tracing::info!(%id, modified = outcome.modified, "updated one document");
        self.report.updated(outcome.modified)?;
        self.show_first().await?;

        Ok(outcome)
    }

    /// Clamps every `someInteger` above the limit down to it.
    pub async fn clamp_integers(&mut self) -> DemoResult<UpdateOutcome> {
        let outcome = self.examples
            .update_many(
                Filter::gt(SOME_INTEGER, CLAMP_LIMIT),
                Update::new().set(SOME_INTEGER, CLAMP_LIMIT),
            )
            .await?;

        tracing::info!(modified = outcome.modified, limit = CLAMP_LIMIT, "clamped documents");
        self.report.updated(outcome.modified)?;

        Ok(outcome)
    }

    /// Lists every document in the collection.
    pub async fn show_all(&mut self) -> DemoResult<Vec<ExampleDocument>> {
        let documents = self.examples
            .find_all()
            .await?;

        tracing::info!(count = documents.len(), "found all documents");
        self.report.documents(&documents)?;

        Ok(documents)
    }

    /// Deletes the first document by identifier.
    pub async fn delete_first(&mut self) -> DemoResult<DeleteOutcome> {
        let id = self.require_first_id("delete_first")?;
        let outcome = self.examples
            .delete_by_id(id)
            .await?;

        tracing::info!(%id, deleted = outcome.deleted, "deleted document");
        self.report.deleted(outcome.deleted)?;

        Ok(outcome)
    }

    /// Waits for the configured pause.
    pub async fn pause(&self) {
        tracing::info!(pause = ?self.config.pause, "pausing before exit");
        tokio::time::sleep(self.config.pause).await;
    }

    /// Runs every step in order, stopping at the first failure.
    pub async fn run_steps(&mut self) -> DemoResult<()> {
        self.insert_first().await?;
        self.insert_batch().await?;
        self.show_first().await?;
        self.show_below_threshold().await?;
        self.update_integer_by_id().await?;
        self.update_string_by_filter().await?;
        self.clamp_integers().await?;
        self.show_all().await?;
        self.delete_first().await?;
        self.pause().await;

        Ok(())
    }

    /// Drops the demo collection.
    pub async fn cleanup(&self) -> DemoResult<()> {
        self.examples.drop().await?;
        tracing::info!(collection = self.examples.name(), "dropped demo collection");

        Ok(())
    }

    /// Runs the whole sequence, then drops the collection whether or not it succeeded.
    ///
    /// A step failure takes precedence over a cleanup failure.
    pub async fn run(&mut self) -> DemoResult<()> {
        let outcome = self.run_steps().await;
        let cleanup = self.cleanup().await;

        if let (Err(_), Err(err)) = (&outcome, &cleanup) {
            tracing::warn!(error = %err, "failed to drop demo collection after an aborted run");
        }

        outcome.and(cleanup)
    }
}
