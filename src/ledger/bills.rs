// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Scheduled bills and debt installments.

use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, BillStatus, ScheduledTransaction, Transaction, TxKind};
use crate::money::ensure_positive;
use crate::session::Session;
use crate::store::{encode, Batch, Collection, Direction, LedgerStore, Op, Patch};

use super::{commit_funded, ensure_funds, fetch, month_bounds, non_empty};

#[derive(Debug, Clone)]
pub struct NewBill {
    pub description: String,
    pub amount: Decimal,
    pub category_name: String,
    pub due_date: NaiveDate,
    pub is_recurring: bool,
}

pub fn create(
    store: &dyn LedgerStore,
    session: &Session,
    new: NewBill,
) -> LedgerResult<ScheduledTransaction> {
    let bill = ScheduledTransaction {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        description: non_empty(&new.description, "description")?,
        amount: ensure_positive(new.amount, "amount")?,
        category_name: non_empty(&new.category_name, "category")?,
        due_date: new.due_date,
        status: BillStatus::Pending,
        is_recurring: new.is_recurring,
        paid_at: None,
    };
    let mut batch = Batch::new();
    batch.insert(Collection::ScheduledTransactions, bill.id.clone(), encode(&bill)?);
    store.commit(batch)?;
    info!(id = %bill.id, due = %bill.due_date, "bill scheduled");
    Ok(bill)
}

#[derive(Debug, Clone, Default)]
pub struct BillEdit {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category_name: Option<String>,
    pub due_date: Option<NaiveDate>,
}

pub fn edit(
    store: &dyn LedgerStore,
    session: &Session,
    id: &str,
    changes: BillEdit,
) -> LedgerResult<ScheduledTransaction> {
    let mut bill: ScheduledTransaction =
        fetch(store, session, Collection::ScheduledTransactions, id, "bill")?;
    let mut patch = Patch::new();
    if let Some(description) = changes.description {
        bill.description = non_empty(&description, "description")?;
        patch = patch.set("description", Value::String(bill.description.clone()));
    }
    if let Some(amount) = changes.amount {
        bill.amount = ensure_positive(amount, "amount")?;
        patch = patch.set("amount", Value::String(bill.amount.to_string()));
    }
    if let Some(category) = changes.category_name {
        bill.category_name = non_empty(&category, "category")?;
        patch = patch.set("categoryName", Value::String(bill.category_name.clone()));
    }
    if let Some(due) = changes.due_date {
        bill.due_date = due;
        patch = patch.set("dueDate", Value::String(due.to_string()));
    }
    if patch.is_empty() {
        return Err(LedgerError::validation("nothing to change"));
    }
    store.update(Collection::ScheduledTransactions, id, patch)?;
    info!(id, "bill edited");
    Ok(bill)
}

pub fn delete(store: &dyn LedgerStore, session: &Session, id: &str) -> LedgerResult<()> {
    let _: ScheduledTransaction =
        fetch(store, session, Collection::ScheduledTransactions, id, "bill")?;
    store.delete(Collection::ScheduledTransactions, id)?;
    info!(id, "bill deleted");
    Ok(())
}

/// Pending bills, earliest due date first.
pub fn pending(store: &dyn LedgerStore, session: &Session) -> LedgerResult<Vec<ScheduledTransaction>> {
    let query = session
        .scoped(Collection::ScheduledTransactions)
        .where_eq("status", BillStatus::Pending.as_str())
        .order_by("dueDate", Direction::Asc);
    store
        .query(&query)?
        .into_iter()
        .map(|doc| doc.decode().map_err(LedgerError::from))
        .collect()
}

/// Bills of any status due within `year-month`.
pub fn due_in_month(
    store: &dyn LedgerStore,
    session: &Session,
    year: i32,
    month: u32,
) -> LedgerResult<Vec<ScheduledTransaction>> {
    let (start, end) = month_bounds(year, month)?;
    let query = session
        .scoped(Collection::ScheduledTransactions)
        .filter("dueDate", Op::Gte, start.to_string())
        .filter("dueDate", Op::Lt, end.to_string())
        .order_by("dueDate", Direction::Asc);
    store
        .query(&query)?
        .into_iter()
        .map(|doc| doc.decode().map_err(LedgerError::from))
        .collect()
}

/// Same day next month, clamped to the month's last day.
pub fn next_due_date(due: NaiveDate) -> LedgerResult<NaiveDate> {
    due.checked_add_months(Months::new(1))
        .ok_or_else(|| LedgerError::validation(format!("cannot advance due date {}", due)))
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub bill: ScheduledTransaction,
    pub transaction: Transaction,
    pub next: Option<ScheduledTransaction>,
}

/// Pays a pending bill from `funding_account_id`.
pub fn settle(
    store: &dyn LedgerStore,
    session: &Session,
    bill_id: &str,
    funding_account_id: &str,
) -> LedgerResult<Settlement> {
    let mut bill: ScheduledTransaction =
        fetch(store, session, Collection::ScheduledTransactions, bill_id, "bill")?;
    if bill.status == BillStatus::Paid {
        return Err(LedgerError::validation(format!(
            "bill '{}' is already paid",
            bill.description
        )));
    }
    let account: Account = fetch(store, session, Collection::Accounts, funding_account_id, "account")?;
    let available = ensure_funds(store, session, &account.id, bill.amount)?;

    let now = Utc::now();
    let tx = Transaction {
        id: store.new_id(),
        user_id: session.user_id().to_string(),
        amount: bill.amount,
        kind: TxKind::Expense,
        category: bill.category_name.clone(),
        account_id: Some(account.id.clone()),
        description: Some(format!("Payment of: {}", bill.description)),
        created_at: now,
    };
    let next = if bill.is_recurring {
        Some(ScheduledTransaction {
            id: store.new_id(),
            due_date: next_due_date(bill.due_date)?,
            status: BillStatus::Pending,
            paid_at: None,
            ..bill.clone()
        })
    } else {
        None
    };

    let mut batch = Batch::new();
    batch.insert(Collection::Transactions, tx.id.clone(), encode(&tx)?);
    batch.update(
        Collection::ScheduledTransactions,
        bill.id.clone(),
        Patch::new()
            .set("status", Value::String(BillStatus::Paid.as_str().to_string()))
            .set("paidAt", Value::String(now.to_rfc3339())),
    );
    batch.update(
        Collection::Accounts,
        account.id.clone(),
        Patch::new().guarded_increment("balance", -bill.amount, Decimal::ZERO),
    );
    if let Some(next) = &next {
        batch.insert(Collection::ScheduledTransactions, next.id.clone(), encode(next)?);
    }
    commit_funded(store, batch, &account.id, available, bill.amount)?;

    bill.status = BillStatus::Paid;
    bill.paid_at = Some(now);
    info!(id = %bill.id, account = %account.id, amount = %bill.amount, recurring = bill.is_recurring, "bill settled");
    Ok(Settlement {
        bill,
        transaction: tx,
        next,
    })
}
