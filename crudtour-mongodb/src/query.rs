//! Translation from crudtour filters and updates to MongoDB syntax.
//!
//! Filters become query documents through the [`QueryVisitor`] trait; updates become
//! operator documents grouped by operator (`$set`, `$unset`, `$inc`).

use bson::{Document, doc};

use crudtour_core::{
    query::{QueryVisitor, Expr, FieldOp},
    update::{Update, UpdateOp},
    error::DocumentStoreError,
};


/// Translates crudtour filter expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl MongoQueryTranslator {
    /// Translates an optional filter; `None` selects every document.
    pub(crate) fn filter(expr: Option<&Expr>) -> Result<Document, DocumentStoreError> {
        match expr {
            Some(expr) => MongoQueryTranslator.visit_expr(expr),
            None => Ok(doc! {}),
        }
    }
}

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$or": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    // `$not` only applies to field operators, so whole-expression negation uses `$nor`.
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            "$nor": [self.visit_expr(expr)?],
        })
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: { "$exists": should_exist },
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &bson::Bson) -> Result<Self::Output, Self::Error> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$ne": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::AnyOf | FieldOp::NoneOf => {
                    if value.as_array().is_none() {
                        return Err(DocumentStoreError::Backend(format!("Membership filter on {field} requires an array of values")));
                    }

                    match op {
                        FieldOp::AnyOf => doc! { "$in": value },
                        _ => doc! { "$nin": value },
                    }
                },
            }
        })
    }
}

/// Translates an [`Update`] into a MongoDB update document.
pub(crate) fn translate_update(update: &Update) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();
    let mut inc = Document::new();

    for op in update.ops() {
        match op {
            UpdateOp::Set(field, value) => {
                set.insert(field.clone(), value.clone());
            },
            UpdateOp::Unset(field) => {
                unset.insert(field.clone(), "");
            },
            UpdateOp::Inc(field, amount) => {
                inc.insert(field.clone(), amount.clone());
            },
        }
    }

    let mut translated = Document::new();

    for (operator, fields) in [("$set", set), ("$unset", unset), ("$inc", inc)] {
        if !fields.is_empty() {
            translated.insert(operator, fields);
        }
    }

    translated
}
