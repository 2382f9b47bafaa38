//! Filter evaluation for in-memory documents.
//!
//! Matching follows MongoDB's rules for the operators crudtour exposes: comparisons only
//! match values of the same kind, equality against an array field matches any element,
//! and a missing field reads as null, so `Ne`/`NoneOf` match documents without it.

use std::{collections::HashMap, cmp::Ordering};
use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use crudtour_core::{
    query::{QueryVisitor, Expr, FieldOp},
    error::{DocumentStoreError, DocumentStoreResult},
};


/// Comparable representation of BSON values.
///
/// Integers keep their exact value; they only meet floating point when compared with a
/// double, so `12` and `12.0` compare equal without losing precision above 2^53.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    DateTime(DateTime),
    ObjectId(ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    /// Types filters cannot express, such as binary or decimal values. Never equal or ordered.
    Other,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Double(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Other,
        }
    }
}

/// Orders an integer against a double without rounding the integer.
fn compare_int_double(int: i64, double: f64) -> Option<Ordering> {
    // 2^63, the first double above every i64.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

    if double.is_nan() {
        return None;
    }
    if double >= I64_BOUND {
        return Some(Ordering::Less);
    }
    if double < -I64_BOUND {
        return Some(Ordering::Greater);
    }

    let whole = double.trunc();

    Some(match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(double - whole))?,
        ordering => ordering,
    })
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Int(a), Comparable::Int(b)) => a == b,
            (Comparable::Double(a), Comparable::Double(b)) => a == b,
            (Comparable::Int(a), Comparable::Double(b)) => compare_int_double(*a, *b) == Some(Ordering::Equal),
            (Comparable::Double(a), Comparable::Int(b)) => compare_int_double(*b, *a) == Some(Ordering::Equal),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Int(b)) => a.partial_cmp(b),
            (Comparable::Double(a), Comparable::Double(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Double(b)) => compare_int_double(*a, *b),
            (Comparable::Double(a), Comparable::Int(b)) => compare_int_double(*b, *a).map(Ordering::reverse),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl<'a> Comparable<'a> {
    /// Equality as MongoDB applies it: an array field also matches when any element is equal.
    fn matches(&self, value: &Comparable<'a>) -> bool {
        match self {
            Comparable::Array(items) if !matches!(value, Comparable::Array(_)) => {
                items.iter().any(|item| item == value)
            },
            _ => self == value,
        }
    }

    /// Ordering against `value`, also trying each element of an array field.
    fn compares(&self, value: &Comparable<'a>, accept: impl Fn(Ordering) -> bool) -> bool {
        match self {
            Comparable::Array(items) => items
                .iter()
                .any(|item| item.partial_cmp(value).is_some_and(&accept)),
            _ => self.partial_cmp(value).is_some_and(accept),
        }
    }
}


pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> DocumentStoreResult<bool> {
        self.visit_expr(expr)
    }

    /// Returns whether `document` matches, treating a missing filter as match-all.
    pub fn matches(document: &'a Document, filter: Option<&Expr>) -> DocumentStoreResult<bool> {
        match filter {
            Some(expr) => DocumentEvaluator::new(document).evaluate(expr),
            None => Ok(true),
        }
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> Result<Self::Output, Self::Error> {
        Ok(self.document.contains_key(field) == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        let target = Comparable::from(value);
        // A missing field reads as null, as MongoDB treats it in equality and membership.
        let current = self.document
            .get(field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);

        match op {
            FieldOp::Eq => Ok(current.matches(&target)),
            FieldOp::Ne => Ok(!current.matches(&target)),
            FieldOp::Gt => Ok(current.compares(&target, |o| o == Ordering::Greater)),
            FieldOp::Gte => Ok(current.compares(&target, |o| o != Ordering::Less)),
            FieldOp::Lt => Ok(current.compares(&target, |o| o == Ordering::Less)),
            FieldOp::Lte => Ok(current.compares(&target, |o| o != Ordering::Greater)),
            FieldOp::AnyOf | FieldOp::NoneOf => {
                let Comparable::Array(values) = target else {
                    return Err(DocumentStoreError::InvalidDocument(format!("Membership filter on {field} requires an array of values")));
                };
                let found = values.iter().any(|candidate| current.matches(candidate));

                Ok(if *op == FieldOp::AnyOf { found } else { !found })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use crudtour_core::query::Filter;

    fn example() -> Document {
        doc! {
            "someString": "Example String",
            "someInteger": 12,
            "someStringSlice": ["Example 1", "Example 2", "Example 3"],
        }
    }

    fn eval(expr: Expr) -> bool {
        DocumentEvaluator::new(&example()).evaluate(&expr).unwrap()
    }

    #[test]
    fn numeric_comparisons_cross_integer_widths() {
        assert!(eval(Filter::lt("someInteger", 60_i64)));
        assert!(eval(Filter::eq("someInteger", 12.0)));
        assert!(!eval(Filter::gt("someInteger", 60)));
        assert!(eval(Filter::gte("someInteger", 12)));
        assert!(eval(Filter::lte("someInteger", 12)));
    }

    #[test]
    fn mismatched_types_never_compare() {
        assert!(!eval(Filter::lt("someString", 60)));
        assert!(!eval(Filter::gt("someString", 60)));
    }

    #[test]
    fn array_field_matches_any_element() {
        assert!(eval(Filter::eq("someStringSlice", "Example 2")));
        assert!(!eval(Filter::eq("someStringSlice", "Example 9")));
        assert!(eval(Filter::any_of("someStringSlice", ["Example 9", "Example 3"])));
        assert!(eval(Filter::none_of("someStringSlice", ["Example 9"])));
    }

    #[test]
    fn missing_field_semantics() {
        assert!(!eval(Filter::eq("missing", 1)));
        assert!(!eval(Filter::lt("missing", 1)));
        assert!(eval(Filter::ne("missing", 1)));
        assert!(eval(Filter::none_of("missing", [1])));
        assert!(eval(Filter::not_exists("missing")));
        assert!(!eval(Filter::exists("missing")));
    }

    #[test]
    fn large_integers_compare_exactly() {
        let document = doc! { "n": 9_007_199_254_740_993_i64 };
        let eval = |expr: Expr| DocumentEvaluator::new(&document).evaluate(&expr).unwrap();

        assert!(!eval(Filter::eq("n", 9_007_199_254_740_992_i64)));
        assert!(eval(Filter::eq("n", 9_007_199_254_740_993_i64)));
        assert!(eval(Filter::gt("n", 9_007_199_254_740_992_i64)));
        assert!(!eval(Filter::lt("n", 9_007_199_254_740_993_i64)));
        assert!(eval(Filter::gt("n", 9_007_199_254_740_992.0)));
        assert!(!eval(Filter::eq("n", 9_007_199_254_740_992.0)));
        assert!(eval(Filter::lt("n", 1e19)));
    }

    #[test]
    fn fractional_doubles_order_against_integers() {
        assert!(eval(Filter::lt("someInteger", 12.5)));
        assert!(eval(Filter::gt("someInteger", 11.5)));
        assert!(!eval(Filter::eq("someInteger", 12.5)));
        assert!(!eval(Filter::lt("someInteger", f64::NAN)));
    }

    #[test]
    fn null_matches_missing_but_not_unsupported_types() {
        let blob = Bson::Binary(bson::Binary {
            subtype: bson::spec::BinarySubtype::Generic,
            bytes: vec![1, 2],
        });
        let document = doc! { "blob": blob, "empty": Bson::Null };
        let eval = |expr: Expr| DocumentEvaluator::new(&document).evaluate(&expr).unwrap();

        assert!(eval(Filter::eq("missing", Bson::Null)));
        assert!(eval(Filter::eq("empty", Bson::Null)));
        assert!(!eval(Filter::eq("blob", Bson::Null)));
        assert!(eval(Filter::ne("blob", Bson::Null)));
        assert!(eval(Filter::any_of("missing", [Bson::Null])));
        assert!(!eval(Filter::none_of("missing", [Bson::Null])));
    }

    #[test]
    fn logical_combinators() {
        assert!(eval(Filter::and([Filter::exists("someString"), Filter::lt("someInteger", 60)])));
        assert!(eval(Filter::or([Filter::gt("someInteger", 60), Filter::eq("someString", "Example String")])));
        assert!(!eval(Filter::lt("someInteger", 60).not()));
    }

    #[test]
    fn object_id_equality() {
        let id = ObjectId::new();
        let mut document = example();
        document.insert("_id", id);

        assert!(DocumentEvaluator::new(&document).evaluate(&Filter::id(id)).unwrap());
        assert!(!DocumentEvaluator::new(&document).evaluate(&Filter::id(ObjectId::new())).unwrap());
    }

    #[test]
    fn membership_requires_array_value() {
        let expr = Expr::field("someInteger".to_string(), FieldOp::AnyOf, Bson::Int32(1));

        assert!(DocumentEvaluator::new(&example()).evaluate(&expr).is_err());
    }
}
