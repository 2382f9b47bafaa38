//! In-memory backend implementation for crudtour.
//!
//! Implements `StoreBackend` without a server, with the same matching, update, and
//! counting rules as MongoDB for the operators crudtour exposes. It backs the demo's
//! tests and is useful anywhere a throwaway store is enough.
//!
//! # Example
//!
//! ```ignore
//! use crudtour::{backend::StoreBackendBuilder, memory::InMemoryStore, store::DocumentStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await?);
//!     let examples = store.collection("mongo");
//!
//!     examples.insert_one(bson::doc! { "someInteger": 12 }).await?;
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as crudtour_memory;

mod evaluator;
mod updater;
pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
