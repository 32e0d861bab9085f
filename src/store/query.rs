// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cmp::Ordering;

use chrono::DateTime;
use rust_decimal::Decimal;
use serde_json::Value;

use super::{Collection, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Predicate {
    pub fn matches(&self, data: &Value) -> bool {
        let Some(actual) = data.get(&self.field) else {
            return false;
        };
        if self.op == Op::Eq {
            return values_equal(actual, &self.value);
        }
        match compare_values(actual, &self.value) {
            Some(ord) => match self.op {
                Op::Lt => ord == Ordering::Less,
                Op::Lte => ord != Ordering::Greater,
                Op::Gt => ord == Ordering::Greater,
                Op::Gte => ord != Ordering::Less,
                Op::Eq => ord == Ordering::Equal,
            },
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Equality/range predicates over one collection with optional ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: Collection,
    pub predicates: Vec<Predicate>,
    pub order: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            predicates: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn filter(mut self, field: &str, op: Op, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.filter(field, Op::Eq, value)
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// The value of the first string equality predicate on `field`, if any.
    pub fn eq_value(&self, field: &str) -> Option<&str> {
        self.predicates
            .iter()
            .find(|p| p.op == Op::Eq && p.field == field)
            .and_then(|p| p.value.as_str())
    }

    pub fn matches(&self, data: &Value) -> bool {
        self.predicates.iter().all(|p| p.matches(data))
    }

    /// Filters, orders and truncates candidate documents.
    pub fn finish(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut out: Vec<Document> = docs.into_iter().filter(|d| self.matches(&d.data)).collect();
        if let Some((field, direction)) = &self.order {
            out.sort_by(|a, b| {
                let ord = match (a.data.get(field), b.data.get(field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(n) = self.limit {
            out.truncate(n);
        }
        out
    }
}

/// Strings compare exactly; numbers also match their decimal-string form.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            match (super::decimal_field(a), super::decimal_field(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        _ => a == b,
    }
}

/// Orders two field values: numbers and decimal strings numerically,
/// RFC 3339 timestamps chronologically, other strings lexicographically.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => {
            if let (Ok(dx), Ok(dy)) = (x.parse::<Decimal>(), y.parse::<Decimal>()) {
                return Some(dx.cmp(&dy));
            }
            if let (Ok(tx), Ok(ty)) = (
                DateTime::parse_from_rfc3339(x),
                DateTime::parse_from_rfc3339(y),
            ) {
                return Some(tx.cmp(&ty));
            }
            Some(x.cmp(y))
        }
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            match (super::decimal_field(a), super::decimal_field(b)) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => None,
            }
        }
        _ => None,
    }
}
