use std::time::Duration;

use crudtour::{
    bson::oid::ObjectId,
    config::DemoConfig,
    error::DemoError,
    memory::InMemoryStore,
    prelude::*,
    runner::DemoRunner,
    sample::ExampleDocument,
};

fn config() -> DemoConfig {
    DemoConfig::builder()
        .pause(Duration::ZERO)
        .build()
}

fn store() -> DocumentStore<InMemoryStore> {
    DocumentStore::new(InMemoryStore::new())
}

async fn all(store: &DocumentStore<InMemoryStore>, config: &DemoConfig) -> Vec<ExampleDocument> {
    store
        .typed_collection::<ExampleDocument>(&config.collection)
        .find_all()
        .await
        .unwrap()
}

async fn by_id(store: &DocumentStore<InMemoryStore>, config: &DemoConfig, id: ObjectId) -> Option<ExampleDocument> {
    store
        .typed_collection::<ExampleDocument>(&config.collection)
        .find_by_id(id)
        .await
        .unwrap()
}

fn expected(id: ObjectId, some_string: &str, some_integer: i64, slice: &[&str]) -> ExampleDocument {
    let mut document = ExampleDocument::new(some_string, some_integer, slice);
    document.id = Some(id);
    document
}

#[tokio::test]
async fn steps_leave_the_collection_in_the_expected_states() {
    let config = config();
    let store = store();
    let mut runner = DemoRunner::new(&store, &config, Vec::new());

    let first = runner.insert_first().await.unwrap();
    assert_eq!(
        by_id(&store, &config, first).await,
        Some(expected(first, "Example String", 12, &["Example 1", "Example 2", "Example 3"])),
    );

    let batch = runner.insert_batch().await.unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(
        all(&store, &config).await,
        vec![
            expected(first, "Example String", 12, &["Example 1", "Example 2", "Example 3"]),
            expected(batch[0], "Second Example String", 253, &["Example 15", "Example 42", "Example 83", "Example 5"]),
            expected(batch[1], "Another Example String", 54, &["Example 21", "Example 53"]),
        ],
    );

    assert_eq!(runner.show_first().await.unwrap().id, Some(first));

    let below = runner.show_below_threshold().await.unwrap();
    assert_eq!(below.iter().map(|d| d.id).collect::<Vec<_>>(), vec![Some(first), Some(batch[1])]);

    let outcome = runner.update_integer_by_id().await.unwrap();
    assert_eq!(outcome, UpdateOutcome { matched: 1, modified: 1 });
    assert_eq!(by_id(&store, &config, first).await.unwrap().some_integer, 201);

    let outcome = runner.update_string_by_filter().await.unwrap();
    assert_eq!(outcome.modified, 1);
    assert_eq!(by_id(&store, &config, first).await.unwrap().some_string, "The Updated String");

    let outcome = runner.clamp_integers().await.unwrap();
    assert_eq!(outcome.modified, 2);
    let clamped = all(&store, &config).await;
    assert!(clamped.iter().all(|d| d.some_integer <= 60));
    assert_eq!(clamped.iter().map(|d| d.some_integer).collect::<Vec<_>>(), vec![60, 60, 54]);

    assert_eq!(runner.show_all().await.unwrap().len(), 3);

    assert_eq!(runner.delete_first().await.unwrap().deleted, 1);
    assert_eq!(by_id(&store, &config, first).await, None);
    assert_eq!(all(&store, &config).await.len(), 2);

    runner.cleanup().await.unwrap();
    assert!(!store.list_collections().await.unwrap().contains(&config.collection));
}

#[tokio::test]
async fn full_run_reports_every_step_and_drops_the_collection() {
    let config = config();
    let store = store();
    let mut runner = DemoRunner::new(&store, &config, Vec::new());

    runner.run().await.unwrap();

    let first = runner.first_id().unwrap();
    let output = String::from_utf8(runner.into_report().into_inner()).unwrap();
    let lines = output.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], first.to_hex());
    assert!(lines[1].starts_with('[') && lines[1].ends_with(']'));
    assert_eq!(lines[1].split(' ').count(), 2);
    assert_eq!(output.matches("Number of items updated: ").count(), 3);
    assert!(output.contains("Number of items updated: 1\n"));
    assert!(output.contains("Number of items updated: 2\n"));
    assert!(output.ends_with("Number of items deleted: 1\n"));
    assert!(output.contains(&format!("Item with ID: {first} contains the following:\nsomeString: The Updated String\nsomeInteger: 201\n")));
    assert!(output.contains("someStringSlice: [Example 15 Example 42 Example 83 Example 5]\n"));

    // first lookup, two threshold matches, two re-reads, three remaining
    assert_eq!(output.matches("Item with ID: ").count(), 8);

    assert!(store.list_collections().await.unwrap().is_empty());
}

#[tokio::test]
async fn steps_on_the_first_document_require_it_to_be_inserted() {
    let config = config();
    let store = store();
    let mut runner = DemoRunner::new(&store, &config, Vec::new());

    assert!(matches!(runner.show_first().await, Err(DemoError::FirstDocumentMissing(_))));
    assert!(matches!(runner.delete_first().await, Err(DemoError::FirstDocumentMissing(_))));
}

#[tokio::test]
async fn missing_first_document_aborts_the_run() {
    let config = config();
    let store = store();
    let mut runner = DemoRunner::new(&store, &config, Vec::new());

    let first = runner.insert_first().await.unwrap();
    store
        .typed_collection::<ExampleDocument>(&config.collection)
        .delete_by_id(first)
        .await
        .unwrap();

    assert!(matches!(
        runner.show_first().await,
        Err(DemoError::Store(DocumentStoreError::DocumentNotFound(_, _))),
    ));
}

#[tokio::test]
async fn undecodable_document_aborts_the_lookup() {
    let config = config();
    let store = store();
    let mut runner = DemoRunner::new(&store, &config, Vec::new());

    let first = runner.insert_first().await.unwrap();
    store
        .collection(&config.collection)
        .update_one(Filter::id(first), Update::new().set("someInteger", "not a number"))
        .await
        .unwrap();

    assert!(matches!(
        runner.show_first().await,
        Err(DemoError::Store(DocumentStoreError::Serialization(_))),
    ));
}

#[tokio::test]
async fn failed_run_still_drops_the_collection() {
    let config = config();
    let store = store();

    // Matches the threshold query but cannot decode as an example document.
    store
        .collection(&config.collection)
        .insert_one(crudtour::bson::doc! { "someString": "bad", "someInteger": 1, "someStringSlice": "not a list" })
        .await
        .unwrap();

    let mut runner = DemoRunner::new(&store, &config, Vec::new());

    assert!(matches!(runner.run().await, Err(DemoError::Store(DocumentStoreError::Serialization(_)))));
    assert!(store.list_collections().await.unwrap().is_empty());
}
