// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The document store contract the ledger is written against.
//!
//! Documents are JSON objects grouped into collections. Money fields are
//! decimal strings so that increments stay exact. A [`Batch`] is the only
//! multi-document write and is applied all-or-nothing.

pub mod memory;
pub mod query;
pub mod sqlite;

use std::fmt;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use query::{Direction, Op, Predicate, Query};
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} does not exist")]
    NotFound { collection: Collection, id: String },

    #[error("document {collection}/{id} already exists")]
    AlreadyExists { collection: Collection, id: String },

    #[error("guarded update of {collection}/{id}.{field} would go below its floor")]
    GuardFailed {
        collection: Collection,
        id: String,
        field: String,
    },

    #[error("field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Accounts,
    Categories,
    Transactions,
    Budgets,
    ScheduledTransactions,
    Goals,
    Forecasts,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Accounts => "accounts",
            Collection::Categories => "categories",
            Collection::Transactions => "transactions",
            Collection::Budgets => "budgets",
            Collection::ScheduledTransactions => "scheduled_transactions",
            Collection::Goals => "goals",
            Collection::Forecasts => "forecasts",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Deserializes the body with the document id injected as `id`.
    pub fn decode<T: DeserializeOwned>(self) -> StoreResult<T> {
        let mut data = self.data;
        if let Value::Object(ref mut map) = data {
            map.insert("id".to_string(), Value::String(self.id));
        }
        Ok(serde_json::from_value(data)?)
    }
}

/// Serializes a model into a document body. The `id` field is dropped since it
/// lives in the document key.
pub fn encode<T: Serialize>(value: &T) -> StoreResult<Value> {
    let mut data = serde_json::to_value(value)?;
    match data {
        Value::Object(ref mut map) => {
            map.remove("id");
        }
        _ => {
            return Err(StoreError::InvalidField {
                field: "<root>".into(),
                reason: "documents must be JSON objects".into(),
            });
        }
    }
    Ok(data)
}

/// Reads a numeric field stored either as a decimal string or a JSON number.
pub fn decimal_field(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.parse::<Decimal>().ok(),
        Value::Number(n) => {
            let s = n.to_string();
            s.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(&s).ok())
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Increment {
    field: String,
    by: Decimal,
    floor: Option<Decimal>,
}

/// A partial update: plain field sets followed by numeric increments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    set: Map<String, Value>,
    increments: Vec<Increment>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.set.insert(field.to_string(), value);
        self
    }

    pub fn increment(mut self, field: &str, by: Decimal) -> Self {
        self.increments.push(Increment {
            field: field.to_string(),
            by,
            floor: None,
        });
        self
    }

    /// Like [`Patch::increment`], but the whole batch fails if the resulting
    /// value would be below `floor`.
    pub fn guarded_increment(mut self, field: &str, by: Decimal, floor: Decimal) -> Self {
        self.increments.push(Increment {
            field: field.to_string(),
            by,
            floor: Some(floor),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.increments.is_empty()
    }

    pub fn apply(&self, collection: Collection, id: &str, data: &mut Value) -> StoreResult<()> {
        let map = data.as_object_mut().ok_or_else(|| StoreError::InvalidField {
            field: "<root>".into(),
            reason: format!("{}/{} is not a JSON object", collection, id),
        })?;
        for (field, value) in &self.set {
            map.insert(field.clone(), value.clone());
        }
        for inc in &self.increments {
            let current = match map.get(&inc.field) {
                None | Some(Value::Null) => Decimal::ZERO,
                Some(v) => decimal_field(v).ok_or_else(|| StoreError::InvalidField {
                    field: inc.field.clone(),
                    reason: format!("cannot increment non-numeric value {}", v),
                })?,
            };
            let next = current + inc.by;
            if let Some(floor) = inc.floor {
                if next < floor {
                    return Err(StoreError::GuardFailed {
                        collection,
                        id: id.to_string(),
                        field: inc.field.clone(),
                    });
                }
            }
            map.insert(inc.field.clone(), Value::String(next.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Fails if the id is taken.
    Insert {
        collection: Collection,
        id: String,
        data: Value,
    },
    /// Creates or replaces.
    Set {
        collection: Collection,
        id: String,
        data: Value,
    },
    /// Fails if the document does not exist.
    Update {
        collection: Collection,
        id: String,
        patch: Patch,
    },
    /// Deleting a missing document is not an error.
    Delete { collection: Collection, id: String },
}

/// Writes committed together or not at all.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<Operation>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collection: Collection, id: impl Into<String>, data: Value) {
        self.ops.push(Operation::Insert {
            collection,
            id: id.into(),
            data,
        });
    }

    pub fn set(&mut self, collection: Collection, id: impl Into<String>, data: Value) {
        self.ops.push(Operation::Set {
            collection,
            id: id.into(),
            data,
        });
    }

    pub fn update(&mut self, collection: Collection, id: impl Into<String>, patch: Patch) {
        self.ops.push(Operation::Update {
            collection,
            id: id.into(),
            patch,
        });
    }

    pub fn delete(&mut self, collection: Collection, id: impl Into<String>) {
        self.ops.push(Operation::Delete {
            collection,
            id: id.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.ops
    }
}

/// Backends only need `get`, `query` and `commit`; single writes are one-op batches.
pub trait LedgerStore: Send + Sync {
    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>>;

    fn query(&self, query: &Query) -> StoreResult<Vec<Document>>;

    fn commit(&self, batch: Batch) -> StoreResult<()>;

    fn new_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn insert(&self, collection: Collection, data: Value) -> StoreResult<String> {
        let id = self.new_id();
        let mut batch = Batch::new();
        batch.insert(collection, id.clone(), data);
        self.commit(batch)?;
        Ok(id)
    }

    fn update(&self, collection: Collection, id: &str, patch: Patch) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.update(collection, id, patch);
        self.commit(batch)
    }

    fn delete(&self, collection: Collection, id: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.delete(collection, id);
        self.commit(batch)
    }
}
