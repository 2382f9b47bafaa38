use std::{io, process::ExitCode};
use tracing_subscriber::EnvFilter;

use crudtour::{
    backend::StoreBackendBuilder,
    config::DemoConfig,
    error::DemoResult,
    mongodb::MongoDbStore,
    runner::DemoRunner,
    store::DocumentStore,
};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

async fn run(config: &DemoConfig) -> DemoResult<()> {
    let store = DocumentStore::new(
        MongoDbStore::builder(&config.uri, &config.database)
            .build()
            .await?,
    );

    let outcome = DemoRunner::new(&store, config, io::stdout())
        .run()
        .await;
    let shutdown = store.shutdown().await;

    outcome?;
    Ok(shutdown?)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let config = DemoConfig::default();
    tracing::info!(uri = %config.uri, database = %config.database, collection = %config.collection, "starting demo");

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "demo aborted");
            ExitCode::FAILURE
        },
    }
}
