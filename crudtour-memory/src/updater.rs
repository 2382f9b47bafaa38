//! In-place application of update operators to stored documents.

use bson::{Bson, Document};

use crudtour_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    update::{Update, UpdateOp},
};


/// Applies `update` to `document`, returning whether its content changed.
///
/// The update is applied to a copy first so a failing operator leaves the stored
/// document untouched.
pub(crate) fn apply_update(document: &mut Document, update: &Update) -> DocumentStoreResult<bool> {
    let mut updated = document.clone();

    for op in update.ops() {
        match op {
            UpdateOp::Set(field, value) => {
                updated.insert(field.clone(), value.clone());
            },
            UpdateOp::Unset(field) => {
                updated.remove(field);
            },
            UpdateOp::Inc(field, amount) => {
                let value = match updated.get(field) {
                    Some(current) => increment(field, current, amount)?,
                    None => amount.clone(),
                };
                updated.insert(field.clone(), value);
            },
        }
    }

    if updated == *document {
        return Ok(false);
    }

    *document = updated;
    Ok(true)
}

fn increment(field: &str, current: &Bson, amount: &Bson) -> DocumentStoreResult<Bson> {
    let sum = match (current, amount) {
        (Bson::Int32(a), Bson::Int32(b)) => Some(
            a
                .checked_add(*b)
                .map(Bson::Int32)
                .unwrap_or(Bson::Int64(i64::from(*a) + i64::from(*b))),
        ),
        (Bson::Int32(a), Bson::Int64(b)) => i64::from(*a).checked_add(*b).map(Bson::Int64),
        (Bson::Int64(a), Bson::Int32(b)) => a.checked_add(i64::from(*b)).map(Bson::Int64),
        (Bson::Int64(a), Bson::Int64(b)) => a.checked_add(*b).map(Bson::Int64),
        (Bson::Double(a), Bson::Double(b)) => Some(Bson::Double(a + b)),
        (Bson::Double(a), Bson::Int32(b)) => Some(Bson::Double(a + f64::from(*b))),
        (Bson::Double(a), Bson::Int64(b)) => Some(Bson::Double(a + *b as f64)),
        (Bson::Int32(a), Bson::Double(b)) => Some(Bson::Double(f64::from(*a) + b)),
        (Bson::Int64(a), Bson::Double(b)) => Some(Bson::Double(*a as f64 + b)),
        _ => return Err(DocumentStoreError::InvalidDocument(format!("Cannot increment non-numeric field {field}"))),
    };

    sum.ok_or_else(|| DocumentStoreError::InvalidDocument(format!("Incrementing {field} overflows a 64-bit integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn set_to_same_value_is_not_a_modification() {
        let mut document = doc! { "someInteger": 60 };

        assert!(!apply_update(&mut document, &Update::new().set("someInteger", 60)).unwrap());
        assert!(apply_update(&mut document, &Update::new().set("someInteger", 201)).unwrap());
        assert_eq!(document, doc! { "someInteger": 201 });
    }

    #[test]
    fn set_keeps_field_position() {
        let mut document = doc! { "a": 1, "b": 2 };

        apply_update(&mut document, &Update::new().set("a", 5)).unwrap();

        assert_eq!(document.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn unset_and_inc() {
        let mut document = doc! { "a": 1, "n": i32::MAX };

        apply_update(&mut document, &Update::new().unset("a").inc("n", 1).inc("m", 2)).unwrap();

        assert_eq!(document, doc! { "n": i32::MAX as i64 + 1, "m": 2 });
    }

    #[test]
    fn inc_past_i64_range_is_rejected() {
        let mut document = doc! { "n": i64::MAX, "b": 1 };

        assert!(matches!(
            apply_update(&mut document, &Update::new().set("b", 2).inc("n", 1_i64)),
            Err(DocumentStoreError::InvalidDocument(_)),
        ));
        assert!(apply_update(&mut document, &Update::new().inc("n", 1)).is_err());
        assert_eq!(document, doc! { "n": i64::MAX, "b": 1 });

        let mut document = doc! { "n": i32::MIN };
        assert!(apply_update(&mut document, &Update::new().inc("n", i64::MIN)).is_err());
    }

    #[test]
    fn failed_inc_leaves_document_untouched() {
        let mut document = doc! { "a": "text", "b": 1 };

        assert!(apply_update(&mut document, &Update::new().set("b", 2).inc("a", 1)).is_err());
        assert_eq!(document, doc! { "a": "text", "b": 1 });
    }
}
