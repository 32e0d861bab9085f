// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::Account;
use crate::session::Session;
use crate::store::{encode, Batch, Collection, LedgerStore, Patch};

use super::{fetch, load_all, non_empty, projector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountKind {
    #[default]
    All,
    Standard,
    Reserve,
}

#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    pub kind: AccountKind,
    pub search: Option<String>,
}

impl AccountFilter {
    pub fn matches(&self, account: &Account) -> bool {
        let kind_ok = match self.kind {
            AccountKind::All => true,
            AccountKind::Standard => !account.is_reserve,
            AccountKind::Reserve => account.is_reserve,
        };
        let search_ok = match &self.search {
            Some(s) if !s.trim().is_empty() => account
                .account_name
                .to_lowercase()
                .contains(&s.trim().to_lowercase()),
            _ => true,
        };
        kind_ok && search_ok
    }
}

pub(crate) fn ensure_unique_name(
    store: &dyn LedgerStore,
    session: &Session,
    name: &str,
    except: Option<&str>,
) -> LedgerResult<()> {
    let accounts: Vec<Account> = load_all(store, session, Collection::Accounts)?;
    let taken = accounts.iter().any(|a| {
        Some(a.id.as_str()) != except && a.account_name.to_lowercase() == name.to_lowercase()
    });
    if taken {
        return Err(LedgerError::validation(format!(
            "an account named '{}' already exists",
            name
        )));
    }
    Ok(())
}

pub fn create(
    store: &dyn LedgerStore,
    session: &Session,
    name: &str,
    is_reserve: bool,
) -> LedgerResult<Account> {
    let name = non_empty(name, "account name")?;
    ensure_unique_name(store, session, &name, None)?;
    let account = Account {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        account_name: name,
        balance: Decimal::ZERO,
        is_reserve,
        is_default: false,
        created_at: Utc::now(),
    };
    let mut batch = Batch::new();
    batch.insert(Collection::Accounts, account.id.clone(), encode(&account)?);
    store.commit(batch)?;
    info!(id = %account.id, name = %account.account_name, "account created");
    Ok(account)
}

#[derive(Debug, Clone, Default)]
pub struct AccountEdit {
    pub account_name: Option<String>,
    pub is_reserve: Option<bool>,
}

pub fn edit(
    store: &dyn LedgerStore,
    session: &Session,
    id: &str,
    changes: AccountEdit,
) -> LedgerResult<Account> {
    let mut account: Account = fetch(store, session, Collection::Accounts, id, "account")?;
    let mut patch = Patch::new();
    if let Some(name) = changes.account_name {
        let name = non_empty(&name, "account name")?;
        ensure_unique_name(store, session, &name, Some(id))?;
        patch = patch.set("accountName", Value::String(name.clone()));
        account.account_name = name;
    }
    if let Some(reserve) = changes.is_reserve {
        account.is_reserve = reserve;
        patch = patch.set("isReserve", Value::Bool(reserve));
    }
    if patch.is_empty() {
        return Err(LedgerError::validation("nothing to change"));
    }
    store.update(Collection::Accounts, id, patch)?;
    info!(id, "account edited");
    Ok(account)
}

/// Makes `id` the default account, clearing the flag on any other account.
pub fn set_default(store: &dyn LedgerStore, session: &Session, id: &str) -> LedgerResult<Account> {
    let mut account: Account = fetch(store, session, Collection::Accounts, id, "account")?;
    let accounts: Vec<Account> = load_all(store, session, Collection::Accounts)?;
    let mut batch = Batch::new();
    for other in accounts.iter().filter(|a| a.is_default && a.id != account.id) {
        batch.update(
            Collection::Accounts,
            other.id.clone(),
            Patch::new().set("isDefault", Value::Bool(false)),
        );
    }
    batch.update(
        Collection::Accounts,
        account.id.clone(),
        Patch::new().set("isDefault", Value::Bool(true)),
    );
    store.commit(batch)?;
    account.is_default = true;
    info!(id, "default account set");
    Ok(account)
}

pub fn default_account(store: &dyn LedgerStore, session: &Session) -> LedgerResult<Option<Account>> {
    let query = session
        .scoped(Collection::Accounts)
        .where_eq("isDefault", true);
    match store.query(&query)?.into_iter().next() {
        Some(doc) => Ok(Some(doc.decode()?)),
        None => Ok(None),
    }
}

/// Deletes an account whose recomputed balance is zero.
pub fn delete(store: &dyn LedgerStore, session: &Session, id: &str) -> LedgerResult<()> {
    let account: Account = fetch(store, session, Collection::Accounts, id, "account")?;
    let balance = projector::recomputed_balance(store, session, id)?;
    if !balance.is_zero() {
        return Err(LedgerError::validation(format!(
            "account '{}' still holds {}; move the money out first",
            account.account_name, balance
        )));
    }
    store.delete(Collection::Accounts, id)?;
    info!(id, "account deleted");
    Ok(())
}

/// Accounts with projected balances, filtered and sorted by name.
pub fn list(
    store: &dyn LedgerStore,
    session: &Session,
    filter: &AccountFilter,
) -> LedgerResult<Vec<Account>> {
    Ok(projector::accounts_with_balances(store, session)?
        .into_iter()
        .filter(|a| filter.matches(a))
        .collect())
}

/// Finds an account by id or by case-insensitive name.
pub fn resolve(store: &dyn LedgerStore, session: &Session, key: &str) -> LedgerResult<Account> {
    if let Ok(account) = fetch(store, session, Collection::Accounts, key, "account") {
        return Ok(account);
    }
    let wanted = key.trim().to_lowercase();
    let accounts: Vec<Account> = load_all(store, session, Collection::Accounts)?;
    accounts
        .into_iter()
        .find(|a| a.account_name.to_lowercase() == wanted)
        .ok_or_else(|| LedgerError::not_found("account", key))
}
