//! A guided tour of document CRUD operations against MongoDB.
//!
//! This crate is the entry point of the crudtour workspace. It re-exports the store
//! layer from the sub-crates and provides the demo itself:
//!
//! - [`runner`] - The fixed insert / find / update / delete sequence
//! - [`sample`] - The example document type and the literal data the demo uses
//! - [`report`] - Human-readable output of each step
//! - [`config`] - The fixed connection and pacing parameters
//!
//! # Running the demo against any backend
//!
//! ```ignore
//! use crudtour::{prelude::*, memory::InMemoryStore, config::DemoConfig, runner::DemoRunner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DemoConfig::builder().pause(std::time::Duration::ZERO).build();
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!
//!     DemoRunner::new(&store, &config, std::io::stdout()).run().await?;
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for tests and offline runs
//! - [`mongodb`] - MongoDB storage (requires the `mongodb` feature, on by default)

pub mod config;
pub mod error;
pub mod prelude;
pub mod report;
pub mod runner;
pub mod sample;

pub use crudtour_core::{backend, collection, document, query, store, update};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use crudtour_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use crudtour_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
