//! Core of the crudtour project: a thin, typed layer over document store CRUD calls.
//!
//! - **Document traits** ([`document`]) - Typed documents and their BSON conversions
//! - **Store backend abstraction** ([`backend`]) - The trait each storage backend implements
//! - **Filters and queries** ([`query`]) - Filter expressions, sorting, and pagination
//! - **Updates** ([`update`]) - Field operators and update/delete outcomes
//! - **Collections** ([`collection`]) - Untyped and typed collection handles
//! - **Document store** ([`store`]) - Owner of a backend and entry point for collections
//! - **Error handling** ([`error`]) - The shared error and result types
//!
//! # Example
//!
//! ```ignore
//! use crudtour_core::{document::Document, store::DocumentStore, query::Filter};
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Document)]
//! pub struct Note {
//!     #[document(id)]
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<ObjectId>,
//!     pub body: String,
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as crudtour_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod query;
pub mod store;
pub mod update;

pub use bson;
