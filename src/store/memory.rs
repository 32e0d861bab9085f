// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value;
use tracing::debug;

use super::{Batch, Collection, Document, LedgerStore, Operation, Query, StoreError, StoreResult};

type Collections = HashMap<Collection, BTreeMap<String, Value>>;

/// Process-local store. A batch is applied to a copy of the state, which
/// replaces the live state only when every operation succeeded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, collection: Collection) -> StoreResult<usize> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.get(&collection).map_or(0, BTreeMap::len))
    }
}

impl LedgerStore for MemoryStore {
    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        let Some(docs) = state.get(&query.collection) else {
            return Ok(Vec::new());
        };
        let candidates = docs.iter().map(|(id, data)| Document {
            id: id.clone(),
            data: data.clone(),
        });
        Ok(query.finish(candidates))
    }

    fn commit(&self, batch: Batch) -> StoreResult<()> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let ops = batch.len();
        let mut staged = state.clone();
        for op in batch.into_operations() {
            apply(&mut staged, op)?;
        }
        *state = staged;
        debug!(ops, "memory batch committed");
        Ok(())
    }
}

fn apply(state: &mut Collections, op: Operation) -> StoreResult<()> {
    match op {
        Operation::Insert {
            collection,
            id,
            data,
        } => {
            let docs = state.entry(collection).or_default();
            if docs.contains_key(&id) {
                return Err(StoreError::AlreadyExists { collection, id });
            }
            docs.insert(id, data);
        }
        Operation::Set {
            collection,
            id,
            data,
        } => {
            state.entry(collection).or_default().insert(id, data);
        }
        Operation::Update {
            collection,
            id,
            patch,
        } => {
            let data = state
                .get_mut(&collection)
                .and_then(|docs| docs.get_mut(&id))
                .ok_or_else(|| StoreError::NotFound {
                    collection,
                    id: id.clone(),
                })?;
            patch.apply(collection, &id, data)?;
        }
        Operation::Delete { collection, id } => {
            if let Some(docs) = state.get_mut(&collection) {
                docs.remove(&id);
            }
        }
    }
    Ok(())
}
