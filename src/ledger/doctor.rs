// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Audits stored account balances against the transaction history.

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::LedgerResult;
use crate::models::{Account, Transaction};
use crate::session::Session;
use crate::store::{Batch, Collection, LedgerStore, Patch};

use super::{load_all, projector::project_balances};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drift {
    pub account_id: String,
    pub account_name: String,
    pub stored: Decimal,
    pub projected: Decimal,
}

impl Drift {
    pub fn difference(&self) -> Decimal {
        self.stored - self.projected
    }
}

/// Accounts whose stored balance disagrees with their projection.
pub fn check(store: &dyn LedgerStore, session: &Session) -> LedgerResult<Vec<Drift>> {
    let accounts: Vec<Account> = load_all(store, session, Collection::Accounts)?;
    let transactions: Vec<Transaction> = load_all(store, session, Collection::Transactions)?;
    let projected = project_balances(&accounts, &transactions);
    let drifts: Vec<Drift> = accounts
        .into_iter()
        .filter_map(|a| {
            let p = projected.get(&a.id).copied().unwrap_or_default();
            (a.balance != p).then(|| Drift {
                account_id: a.id,
                account_name: a.account_name,
                stored: a.balance,
                projected: p,
            })
        })
        .collect();
    for d in &drifts {
        warn!(account = %d.account_id, stored = %d.stored, projected = %d.projected, "balance drift");
    }
    Ok(drifts)
}

/// Overwrites drifted stored balances with their projections in one batch.
pub fn fix(store: &dyn LedgerStore, session: &Session) -> LedgerResult<Vec<Drift>> {
    let drifts = check(store, session)?;
    if drifts.is_empty() {
        return Ok(drifts);
    }
    let mut batch = Batch::new();
    for d in &drifts {
        batch.update(
            Collection::Accounts,
            d.account_id.clone(),
            Patch::new().set("balance", Value::String(d.projected.to_string())),
        );
    }
    store.commit(batch)?;
    info!(fixed = drifts.len(), "stored balances rewritten");
    Ok(drifts)
}
