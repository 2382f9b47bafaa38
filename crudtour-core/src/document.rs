//! Core traits for typed document representation and serialization.
//!
//! Backends only ever see raw [`bson::Document`]s. Typed documents implement [`Document`]
//! and get conversions to and from BSON for free through [`DocumentExt`].

use bson::{Document as BsonDocument, oid::ObjectId, de::deserialize_from_document, ser::serialize_to_document};
use serde::{Deserialize, Serialize};

use crate::error::DocumentStoreResult;

pub use crudtour_macros::Document;

/// The field every stored document is keyed by.
pub const ID_FIELD: &str = "_id";

/// Core trait that all typed documents stored in a document store must implement.
///
/// A document that has not been inserted yet has no identifier; the backend assigns one
/// on insert. The identifier field should therefore be an `Option<ObjectId>` serialized as
/// `_id` and skipped when `None`.
///
/// # Deriving
///
/// ```ignore
/// use bson::oid::ObjectId;
/// use crudtour::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize, Document)]
/// pub struct Note {
///     #[document(id)]
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     pub id: Option<ObjectId>,
///     pub body: String,
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the identifier assigned to this document, if it has been stored.
    fn id(&self) -> Option<&ObjectId>;
}

/// Extension trait providing BSON conversions for documents.
///
/// Automatically implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON document for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the value is not a BSON document.
    fn to_document(&self) -> DocumentStoreResult<BsonDocument>;

    /// Creates a typed document from a stored BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if a field is missing or has the wrong type.
    fn from_document(document: BsonDocument) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_document(&self) -> DocumentStoreResult<BsonDocument> {
        Ok(serialize_to_document(self)?)
    }

    fn from_document(document: BsonDocument) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_document(document)?)
    }
}
