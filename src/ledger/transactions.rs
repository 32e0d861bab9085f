// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Transaction, TxKind};
use crate::money::ensure_positive;
use crate::session::Session;
use crate::store::{encode, Batch, Collection, Direction, LedgerStore, Op, Patch};

use super::{commit_funded, ensure_funds, fetch, non_empty};

pub const TRANSFER_CATEGORY: &str = "transfer";

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TxKind,
    pub amount: Decimal,
    pub category: String,
    pub account_id: String,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

pub fn create(
    store: &dyn LedgerStore,
    session: &Session,
    new: NewTransaction,
) -> LedgerResult<Transaction> {
    let amount = ensure_positive(new.amount, "amount")?;
    let category = non_empty(&new.category, "category")?;
    let account: Account = fetch(store, session, Collection::Accounts, &new.account_id, "account")?;

    let tx = Transaction {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        amount,
        kind: new.kind,
        category,
        account_id: Some(account.id.clone()),
        description: clean_description(new.description),
        created_at: new.date.unwrap_or_else(Utc::now),
    };

    let mut batch = Batch::new();
    batch.insert(Collection::Transactions, tx.id.clone(), encode(&tx)?);
    batch.update(
        Collection::Accounts,
        account.id.clone(),
        Patch::new().increment("balance", tx.signed_amount()),
    );
    store.commit(batch)?;
    info!(id = %tx.id, account = %account.id, kind = %tx.kind, amount = %tx.amount, "transaction created");
    Ok(tx)
}

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct Transfer {
    pub debit: Transaction,
    pub credit: Transaction,
}

/// Moves money between two accounts of the same user: an expense on the source,
/// an income on the destination and both balance adjustments in one batch.
pub fn transfer(
    store: &dyn LedgerStore,
    session: &Session,
    req: TransferRequest,
) -> LedgerResult<Transfer> {
    if req.from == req.to {
        return Err(LedgerError::validation(
            "source and destination accounts must differ",
        ));
    }
    let amount = ensure_positive(req.amount, "amount")?;
    let source: Account = fetch(store, session, Collection::Accounts, &req.from, "account")?;
    let dest: Account = fetch(store, session, Collection::Accounts, &req.to, "account")?;
    let available = ensure_funds(store, session, &source.id, amount)?;

    let at = req.date.unwrap_or_else(Utc::now);
    let note = clean_description(req.description);
    let debit = Transaction {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        amount,
        kind: TxKind::Expense,
        category: TRANSFER_CATEGORY.to_string(),
        account_id: Some(source.id.clone()),
        description: Some(
            note.clone()
                .unwrap_or_else(|| format!("Transfer to {}", dest.account_name)),
        ),
        created_at: at,
    };
    let credit = Transaction {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        amount,
        kind: TxKind::Income,
        category: TRANSFER_CATEGORY.to_string(),
        account_id: Some(dest.id.clone()),
        description: Some(note.unwrap_or_else(|| format!("Transfer from {}", source.account_name))),
        created_at: at,
    };

    let mut batch = Batch::new();
    batch.insert(Collection::Transactions, debit.id.clone(), encode(&debit)?);
    batch.insert(Collection::Transactions, credit.id.clone(), encode(&credit)?);
    batch.update(
        Collection::Accounts,
        source.id.clone(),
        Patch::new().guarded_increment("balance", -amount, Decimal::ZERO),
    );
    batch.update(
        Collection::Accounts,
        dest.id.clone(),
        Patch::new().increment("balance", amount),
    );
    commit_funded(store, batch, &source.id, available, amount)?;
    info!(from = %source.id, to = %dest.id, %amount, "transfer committed");
    Ok(Transfer { debit, credit })
}

#[derive(Debug, Clone, Default)]
pub struct TransactionEdit {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl TransactionEdit {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.date.is_none()
    }
}

/// Rewrites a transaction and moves the owning account by the difference
/// between the new and old signed amounts.
pub fn edit(
    store: &dyn LedgerStore,
    session: &Session,
    id: &str,
    changes: TransactionEdit,
) -> LedgerResult<Transaction> {
    if changes.is_empty() {
        return Err(LedgerError::validation("nothing to change"));
    }
    let old: Transaction = fetch(store, session, Collection::Transactions, id, "transaction")?;
    let mut updated = old.clone();
    let mut patch = Patch::new();

    if let Some(amount) = changes.amount {
        updated.amount = ensure_positive(amount, "amount")?;
        patch = patch.set("amount", Value::String(updated.amount.to_string()));
    }
    if let Some(category) = changes.category {
        updated.category = non_empty(&category, "category")?;
        patch = patch.set("category", Value::String(updated.category.clone()));
    }
    if let Some(description) = changes.description {
        updated.description = clean_description(Some(description));
        patch = patch.set(
            "description",
            updated
                .description
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
    }
    if let Some(date) = changes.date {
        updated.created_at = date;
        patch = patch.set("createdAt", timestamp(date));
    }

    let mut batch = Batch::new();
    batch.update(Collection::Transactions, id, patch);
    let delta = updated.signed_amount() - old.signed_amount();
    if let Some(account_id) = live_account(store, session, old.account_id.as_deref())? {
        if !delta.is_zero() {
            batch.update(
                Collection::Accounts,
                account_id,
                Patch::new().increment("balance", delta),
            );
        }
    }
    store.commit(batch)?;
    info!(id, %delta, "transaction edited");
    Ok(updated)
}

pub fn delete(store: &dyn LedgerStore, session: &Session, id: &str) -> LedgerResult<Transaction> {
    let mut removed = delete_many(store, session, &[id.to_string()])?;
    removed
        .pop()
        .ok_or_else(|| LedgerError::not_found("transaction", id))
}

/// Deletes every listed transaction and reverses their effect on account
/// balances, all in one batch. Any unknown id aborts the whole operation.
pub fn delete_many(
    store: &dyn LedgerStore,
    session: &Session,
    ids: &[String],
) -> LedgerResult<Vec<Transaction>> {
    if ids.is_empty() {
        return Err(LedgerError::validation("no transactions selected"));
    }
    let mut removed = Vec::with_capacity(ids.len());
    let mut reversals: BTreeMap<String, Decimal> = BTreeMap::new();
    for id in ids {
        if removed.iter().any(|t: &Transaction| &t.id == id) {
            continue;
        }
        let tx: Transaction = fetch(store, session, Collection::Transactions, id, "transaction")?;
        if let Some(account_id) = live_account(store, session, tx.account_id.as_deref())? {
            *reversals.entry(account_id).or_default() -= tx.signed_amount();
        }
        removed.push(tx);
    }

    let mut batch = Batch::new();
    for tx in &removed {
        batch.delete(Collection::Transactions, tx.id.clone());
    }
    for (account_id, delta) in reversals {
        if !delta.is_zero() {
            batch.update(
                Collection::Accounts,
                account_id,
                Patch::new().increment("balance", delta),
            );
        }
    }
    store.commit(batch)?;
    info!(count = removed.len(), "transactions deleted");
    Ok(removed)
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<String>,
    pub category: Option<String>,
    pub kind: Option<TxKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

/// Newest first.
pub fn list(
    store: &dyn LedgerStore,
    session: &Session,
    filter: &TransactionFilter,
) -> LedgerResult<Vec<Transaction>> {
    let mut query = session
        .scoped(Collection::Transactions)
        .order_by("createdAt", Direction::Desc);
    if let Some(account_id) = &filter.account_id {
        query = query.where_eq("accountId", account_id.as_str());
    }
    if let Some(category) = &filter.category {
        query = query.where_eq("category", category.as_str());
    }
    if let Some(kind) = filter.kind {
        query = query.where_eq("type", kind.as_str());
    }
    if let Some(from) = filter.from {
        query = query.filter("createdAt", Op::Gte, timestamp(from));
    }
    if let Some(to) = filter.to {
        query = query.filter("createdAt", Op::Lt, timestamp(to));
    }
    if let Some(n) = filter.limit {
        query = query.limit(n);
    }
    store
        .query(&query)?
        .into_iter()
        .map(|doc| doc.decode().map_err(LedgerError::from))
        .collect()
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// The account a historical transaction still points at, if it exists.
fn live_account(
    store: &dyn LedgerStore,
    session: &Session,
    account_id: Option<&str>,
) -> LedgerResult<Option<String>> {
    let Some(account_id) = account_id else {
        return Ok(None);
    };
    match store.get(Collection::Accounts, account_id)? {
        Some(doc) if session.owns(&doc.data) => Ok(Some(doc.id)),
        _ => Ok(None),
    }
}
