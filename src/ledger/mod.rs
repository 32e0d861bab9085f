// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger services. Each mutation validates locally, then submits exactly one
//! batch, so a failure never leaves a partial write behind.

pub mod accounts;
pub mod bills;
pub mod budgets;
pub mod categories;
pub mod doctor;
pub mod forecast;
pub mod goals;
pub mod import;
pub mod projector;
pub mod quick_add;
pub mod reports;
pub mod transactions;

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::error::{LedgerError, LedgerResult};
use crate::session::Session;
use crate::store::{Batch, Collection, LedgerStore, StoreError};

/// Loads a document owned by the session user. Documents of other users are
/// reported as missing.
pub(crate) fn fetch<T: DeserializeOwned>(
    store: &dyn LedgerStore,
    session: &Session,
    collection: Collection,
    id: &str,
    kind: &'static str,
) -> LedgerResult<T> {
    match store.get(collection, id)? {
        Some(doc) if session.owns(&doc.data) => Ok(doc.decode()?),
        _ => Err(LedgerError::not_found(kind, id)),
    }
}

pub(crate) fn load_all<T: DeserializeOwned>(
    store: &dyn LedgerStore,
    session: &Session,
    collection: Collection,
) -> LedgerResult<Vec<T>> {
    store
        .query(&session.scoped(collection))?
        .into_iter()
        .map(|doc| doc.decode().map_err(LedgerError::from))
        .collect()
}

/// Pre-flight funds check against the recomputed balance of `account_id`.
/// Returns the available amount.
pub(crate) fn ensure_funds(
    store: &dyn LedgerStore,
    session: &Session,
    account_id: &str,
    requested: Decimal,
) -> LedgerResult<Decimal> {
    let available = projector::recomputed_balance(store, session, account_id)?;
    if available < requested {
        tracing::warn!(account_id, %available, %requested, "rejected: insufficient funds");
        return Err(LedgerError::InsufficientFunds {
            account: account_id.to_string(),
            available,
            requested,
        });
    }
    Ok(available)
}

/// Commits a batch that debits `account_id` through a guarded increment. A
/// tripped guard means the balance moved since the pre-flight check.
pub(crate) fn commit_funded(
    store: &dyn LedgerStore,
    batch: Batch,
    account_id: &str,
    available: Decimal,
    requested: Decimal,
) -> LedgerResult<()> {
    store.commit(batch).map_err(|err| match err {
        StoreError::GuardFailed { .. } => {
            tracing::warn!(account_id, %requested, "rejected: balance guard tripped");
            LedgerError::InsufficientFunds {
                account: account_id.to_string(),
                available,
                requested,
            }
        }
        other => other.into(),
    })
}

pub(crate) fn non_empty(value: &str, what: &str) -> LedgerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation(format!("{} must not be empty", what)));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// First day of `year-month` and of the month after it.
pub fn month_bounds(year: i32, month: u32) -> LedgerResult<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| LedgerError::validation(format!("invalid month {}-{:02}", year, month)))?;
    let end = start
        .checked_add_months(Months::new(1))
        .ok_or_else(|| LedgerError::validation(format!("month {}-{:02} out of range", year, month)))?;
    Ok((start, end))
}
