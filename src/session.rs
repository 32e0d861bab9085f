// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde_json::Value;

use crate::store::{Collection, Query};

/// The user every ledger operation acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// A query over `collection` restricted to this user's documents.
    pub fn scoped(&self, collection: Collection) -> Query {
        Query::new(collection).where_eq("userId", self.user_id.as_str())
    }

    pub fn owns(&self, data: &Value) -> bool {
        data.get("userId").and_then(Value::as_str) == Some(self.user_id.as_str())
    }
}
