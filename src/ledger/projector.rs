// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balances derived from the transaction set, the read-path truth for accounts.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::LedgerResult;
use crate::models::{Account, Transaction};
use crate::session::Session;
use crate::store::{Collection, LedgerStore};

use super::{fetch, load_all};

/// Folds transactions into per-account balances. Every account starts at zero;
/// transactions pointing at an unknown account (or none) are skipped.
pub fn project_balances<'a>(
    accounts: impl IntoIterator<Item = &'a Account>,
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> BTreeMap<String, Decimal> {
    let mut balances: BTreeMap<String, Decimal> = accounts
        .into_iter()
        .map(|a| (a.id.clone(), Decimal::ZERO))
        .collect();
    for tx in transactions {
        let Some(account_id) = tx.account_id.as_deref() else {
            continue;
        };
        if let Some(balance) = balances.get_mut(account_id) {
            *balance += tx.signed_amount();
        }
    }
    balances
}

pub fn account_balances(
    store: &dyn LedgerStore,
    session: &Session,
) -> LedgerResult<BTreeMap<String, Decimal>> {
    let accounts: Vec<Account> = load_all(store, session, Collection::Accounts)?;
    let transactions: Vec<Transaction> = load_all(store, session, Collection::Transactions)?;
    Ok(project_balances(&accounts, &transactions))
}

/// Accounts as stored, with `balance` replaced by the projection.
pub fn accounts_with_balances(
    store: &dyn LedgerStore,
    session: &Session,
) -> LedgerResult<Vec<Account>> {
    let mut accounts: Vec<Account> = load_all(store, session, Collection::Accounts)?;
    let transactions: Vec<Transaction> = load_all(store, session, Collection::Transactions)?;
    let balances = project_balances(&accounts, &transactions);
    for account in &mut accounts {
        account.balance = balances.get(&account.id).copied().unwrap_or_default();
    }
    accounts.sort_by(|a, b| a.account_name.to_lowercase().cmp(&b.account_name.to_lowercase()));
    Ok(accounts)
}

pub fn recomputed_balance(
    store: &dyn LedgerStore,
    session: &Session,
    account_id: &str,
) -> LedgerResult<Decimal> {
    let account: Account = fetch(store, session, Collection::Accounts, account_id, "account")?;
    let query = session
        .scoped(Collection::Transactions)
        .where_eq("accountId", account_id);
    let transactions = store
        .query(&query)?
        .into_iter()
        .map(|doc| doc.decode::<Transaction>())
        .collect::<Result<Vec<_>, _>>()?;
    let balances = project_balances([&account], &transactions);
    Ok(balances.get(account_id).copied().unwrap_or_default())
}

pub fn total<'a>(balances: impl IntoIterator<Item = &'a Decimal>) -> Decimal {
    balances.into_iter().copied().sum()
}
