// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use super::{Batch, Collection, Document, LedgerStore, Operation, Query, StoreError, StoreResult};

/// Document store on a single SQLite table; each batch runs in one SQL transaction.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS documents(
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        body TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY(collection, id)
    );
    CREATE INDEX IF NOT EXISTS idx_documents_user
        ON documents(collection, json_extract(body, '$.userId'));
    "#,
    )?;
    Ok(())
}

fn load(conn: &Connection, collection: Collection, id: &str) -> StoreResult<Option<Value>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection=?1 AND id=?2",
            params![collection.name(), id],
            |r| r.get(0),
        )
        .optional()?;
    match body {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

fn apply(conn: &Connection, op: Operation) -> StoreResult<()> {
    match op {
        Operation::Insert {
            collection,
            id,
            data,
        } => {
            if load(conn, collection, &id)?.is_some() {
                return Err(StoreError::AlreadyExists { collection, id });
            }
            conn.execute(
                "INSERT INTO documents(collection, id, body) VALUES (?1, ?2, ?3)",
                params![collection.name(), id, serde_json::to_string(&data)?],
            )?;
        }
        Operation::Set {
            collection,
            id,
            data,
        } => {
            conn.execute(
                "INSERT INTO documents(collection, id, body) VALUES (?1, ?2, ?3)
                 ON CONFLICT(collection, id) DO UPDATE SET body=excluded.body, updated_at=datetime('now')",
                params![collection.name(), id, serde_json::to_string(&data)?],
            )?;
        }
        Operation::Update {
            collection,
            id,
            patch,
        } => {
            let mut data = load(conn, collection, &id)?.ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.clone(),
            })?;
            patch.apply(collection, &id, &mut data)?;
            conn.execute(
                "UPDATE documents SET body=?3, updated_at=datetime('now') WHERE collection=?1 AND id=?2",
                params![collection.name(), id, serde_json::to_string(&data)?],
            )?;
        }
        Operation::Delete { collection, id } => {
            conn.execute(
                "DELETE FROM documents WHERE collection=?1 AND id=?2",
                params![collection.name(), id],
            )?;
        }
    }
    Ok(())
}

impl LedgerStore for SqliteStore {
    fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(load(&conn, collection, id)?.map(|data| Document {
            id: id.to_string(),
            data,
        }))
    }

    fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut sql = String::from("SELECT id, body FROM documents WHERE collection=?1");
        let mut params_vec: Vec<String> = vec![query.collection.name().to_string()];
        // Narrow by owner in SQL; every other predicate is evaluated on the decoded body.
        if let Some(user_id) = query.eq_value("userId") {
            sql.push_str(" AND json_extract(body, '$.userId')=?2");
            params_vec.push(user_id.to_string());
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
        let mut docs = Vec::new();
        while let Some(r) = rows.next()? {
            let id: String = r.get(0)?;
            let body: String = r.get(1)?;
            docs.push(Document {
                id,
                data: serde_json::from_str(&body)?,
            });
        }
        Ok(query.finish(docs))
    }

    fn commit(&self, batch: Batch) -> StoreResult<()> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let ops = batch.len();
        let tx = conn.transaction()?;
        for op in batch.into_operations() {
            // Dropping `tx` on error rolls the whole batch back.
            apply(&tx, op)?;
        }
        tx.commit()?;
        debug!(ops, "sqlite batch committed");
        Ok(())
    }
}
