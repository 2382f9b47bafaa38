//! The example document the demo stores, and the literal data it uses.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crudtour_core::document::Document;

pub const SOME_STRING: &str = "someString";
pub const SOME_INTEGER: &str = "someInteger";
pub const SOME_STRING_SLICE: &str = "someStringSlice";

/// `someInteger` bound for the range query: documents strictly below it are listed.
pub const QUERY_THRESHOLD: i64 = 60;
/// Value the first document's `someInteger` is set to by identifier.
pub const UPDATED_INTEGER: i64 = 201;
/// Value the first document's `someString` is set to through an `_id` filter.
pub const UPDATED_STRING: &str = "The Updated String";
/// Documents with `someInteger` above this are clamped to it.
pub const CLAMP_LIMIT: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
pub struct ExampleDocument {
    #[document(id)]
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "someString")]
    pub some_string: String,
    #[serde(rename = "someInteger")]
    pub some_integer: i64,
    #[serde(rename = "someStringSlice")]
    pub some_string_slice: Vec<String>,
}

impl ExampleDocument {
    pub fn new(some_string: &str, some_integer: i64, some_string_slice: &[&str]) -> Self {
        Self {
            id: None,
            some_string: some_string.to_string(),
            some_integer,
            some_string_slice: some_string_slice
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// The document inserted on its own, and later updated and deleted.
    pub fn first() -> Self {
        Self::new("Example String", 12, &["Example 1", "Example 2", "Example 3"])
    }

    /// The two documents inserted together.
    pub fn batch() -> Vec<Self> {
        vec![
            Self::new("Second Example String", 253, &["Example 15", "Example 42", "Example 83", "Example 5"]),
            Self::new("Another Example String", 54, &["Example 21", "Example 53"]),
        ]
    }
}
