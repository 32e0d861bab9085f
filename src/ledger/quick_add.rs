// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! One-line expense entry: `<amount> <category> [description]`.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Transaction, TxKind};
use crate::money::{ensure_positive, parse_amount};
use crate::session::Session;
use crate::store::{encode, Batch, Collection, LedgerStore};

use super::{accounts, transactions};

static QUICK_ADD: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:[.,]\d+)?)\s+([\p{L}\d_]+)(?:\s+(.+?))?\s*$"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickExpense {
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
}

pub fn parse(text: &str) -> LedgerResult<QuickExpense> {
    let pattern = QUICK_ADD
        .as_ref()
        .map_err(|e| LedgerError::validation(format!("quick-add pattern: {}", e)))?;
    let caps = pattern.captures(text).ok_or_else(|| {
        LedgerError::validation("invalid format, use: <amount> <category> [description]")
    })?;
    let amount = ensure_positive(parse_amount(&caps[1])?, "amount")?;
    Ok(QuickExpense {
        amount,
        category: caps[2].to_lowercase(),
        description: caps.get(3).map(|m| m.as_str().to_string()),
    })
}

/// Records the parsed expense against the default account. Without a default
/// account the transaction is stored unassigned and moves no balance.
pub fn record(store: &dyn LedgerStore, session: &Session, text: &str) -> LedgerResult<Transaction> {
    let expense = parse(text)?;
    if let Some(account) = accounts::default_account(store, session)? {
        return transactions::create(
            store,
            session,
            transactions::NewTransaction {
                kind: TxKind::Expense,
                amount: expense.amount,
                category: expense.category,
                account_id: account.id,
                description: expense.description,
                date: None,
            },
        );
    }

    let tx = Transaction {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        amount: expense.amount,
        kind: TxKind::Expense,
        category: expense.category,
        account_id: None,
        description: expense.description,
        created_at: Utc::now(),
    };
    let mut batch = Batch::new();
    batch.insert(Collection::Transactions, tx.id.clone(), encode(&tx)?);
    store.commit(batch)?;
    info!(id = %tx.id, amount = %tx.amount, "unassigned expense recorded");
    Ok(tx)
}
