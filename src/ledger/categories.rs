// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Categories are referenced by name from transactions, budgets and bills,
//! so a rename rewrites those references in the same batch.

use serde_json::Value;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, Category, TxKind};
use crate::session::Session;
use crate::store::{encode, Batch, Collection, LedgerStore, Patch};

use super::{fetch, load_all};

pub fn normalize_name(name: &str) -> LedgerResult<String> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(LedgerError::validation("category name must not be empty"));
    }
    Ok(name)
}

pub fn find(store: &dyn LedgerStore, session: &Session, name: &str) -> LedgerResult<Option<Category>> {
    let name = normalize_name(name)?;
    let query = session
        .scoped(Collection::Categories)
        .where_eq("name", name.as_str());
    match store.query(&query)?.into_iter().next() {
        Some(doc) => Ok(Some(doc.decode()?)),
        None => Ok(None),
    }
}

pub fn create(
    store: &dyn LedgerStore,
    session: &Session,
    name: &str,
    kind: TxKind,
) -> LedgerResult<Category> {
    let name = normalize_name(name)?;
    if find(store, session, &name)?.is_some() {
        return Err(LedgerError::validation(format!("category '{}' already exists", name)));
    }
    let category = Category {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        name,
        kind,
    };
    let mut batch = Batch::new();
    batch.insert(Collection::Categories, category.id.clone(), encode(&category)?);
    store.commit(batch)?;
    info!(id = %category.id, name = %category.name, kind = %category.kind, "category created");
    Ok(category)
}

/// Changes a category's name and/or type. Renames carry over to every
/// transaction, bill and budget that referenced the old name.
pub fn edit(
    store: &dyn LedgerStore,
    session: &Session,
    id: &str,
    new_name: Option<&str>,
    new_kind: Option<TxKind>,
) -> LedgerResult<Category> {
    let mut category: Category = fetch(store, session, Collection::Categories, id, "category")?;
    let old_name = category.name.clone();
    let mut batch = Batch::new();
    let mut patch = Patch::new();

    if let Some(kind) = new_kind {
        category.kind = kind;
        patch = patch.set("type", Value::String(kind.as_str().to_string()));
    }
    if let Some(name) = new_name {
        let name = normalize_name(name)?;
        if name != old_name {
            if find(store, session, &name)?.is_some() {
                return Err(LedgerError::validation(format!("category '{}' already exists", name)));
            }
            patch = patch.set("name", Value::String(name.clone()));
            rewrite_references(store, session, &mut batch, &old_name, &name)?;
            category.name = name;
        }
    }
    if patch.is_empty() {
        return Err(LedgerError::validation("nothing to change"));
    }
    batch.update(Collection::Categories, id, patch);
    let ops = batch.len();
    store.commit(batch)?;
    info!(id, name = %category.name, ops, "category edited");
    Ok(category)
}

pub fn rename(
    store: &dyn LedgerStore,
    session: &Session,
    id: &str,
    new_name: &str,
) -> LedgerResult<Category> {
    edit(store, session, id, Some(new_name), None)
}

fn rewrite_references(
    store: &dyn LedgerStore,
    session: &Session,
    batch: &mut Batch,
    old: &str,
    new: &str,
) -> LedgerResult<()> {
    let renamed = Value::String(new.to_string());

    let txs = session.scoped(Collection::Transactions).where_eq("category", old);
    for doc in store.query(&txs)? {
        batch.update(
            Collection::Transactions,
            doc.id,
            Patch::new().set("category", renamed.clone()),
        );
    }
    let bills = session
        .scoped(Collection::ScheduledTransactions)
        .where_eq("categoryName", old);
    for doc in store.query(&bills)? {
        batch.update(
            Collection::ScheduledTransactions,
            doc.id,
            Patch::new().set("categoryName", renamed.clone()),
        );
    }
    // Budget ids embed the category name, so budgets move to a new key.
    let budgets = session
        .scoped(Collection::Budgets)
        .where_eq("categoryName", old);
    for doc in store.query(&budgets)? {
        let old_id = doc.id.clone();
        let mut budget: Budget = doc.decode()?;
        budget.category_name = new.to_string();
        budget.id = Budget::doc_id(session.user_id(), budget.year, budget.month, new);
        batch.delete(Collection::Budgets, old_id);
        batch.set(Collection::Budgets, budget.id.clone(), encode(&budget)?);
    }
    Ok(())
}

pub fn delete(store: &dyn LedgerStore, session: &Session, id: &str) -> LedgerResult<()> {
    let _: Category = fetch(store, session, Collection::Categories, id, "category")?;
    store.delete(Collection::Categories, id)?;
    info!(id, "category deleted");
    Ok(())
}

/// Categories sorted by name, optionally restricted to one type.
pub fn list(
    store: &dyn LedgerStore,
    session: &Session,
    kind: Option<TxKind>,
) -> LedgerResult<Vec<Category>> {
    let mut categories: Vec<Category> = load_all(store, session, Collection::Categories)?;
    if let Some(kind) = kind {
        categories.retain(|c| c.kind == kind);
    }
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(categories)
}

