// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, Transaction, TxKind};
use crate::session::Session;
use crate::store::{encode, Batch, Collection, LedgerStore, Op};

use super::{categories, month_bounds, start_of_day};

fn checked_amount(amount: Decimal) -> LedgerResult<Decimal> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "budget amount must not be negative, got {}",
            amount
        )));
    }
    Ok(amount)
}

fn budget_for(session: &Session, category: &str, year: i32, month: u32, amount: Decimal) -> Budget {
    Budget {
        id: Budget::doc_id(session.user_id(), year, month, category),
        user_id: session.user_id().to_string(),
        category_name: category.to_string(),
        amount,
        month,
        year,
    }
}

/// Creates or overwrites the budget of one category for `year-month`.
pub fn save(
    store: &dyn LedgerStore,
    session: &Session,
    category: &str,
    year: i32,
    month: u32,
    amount: Decimal,
) -> LedgerResult<Budget> {
    month_bounds(year, month)?;
    let category = categories::normalize_name(category)?;
    let budget = budget_for(session, &category, year, month, checked_amount(amount)?);
    let mut batch = Batch::new();
    batch.set(Collection::Budgets, budget.id.clone(), encode(&budget)?);
    store.commit(batch)?;
    info!(id = %budget.id, amount = %budget.amount, "budget saved");
    Ok(budget)
}

/// Writes one budget per expense category for the month in a single batch;
/// categories missing from `amounts` are saved as zero.
pub fn save_month(
    store: &dyn LedgerStore,
    session: &Session,
    year: i32,
    month: u32,
    amounts: &BTreeMap<String, Decimal>,
) -> LedgerResult<Vec<Budget>> {
    month_bounds(year, month)?;
    let expense_names: Vec<String> = categories::list(store, session, Some(TxKind::Expense))?
        .into_iter()
        .map(|c| c.name)
        .collect();
    let mut wanted = BTreeMap::new();
    for (name, amount) in amounts {
        let name = categories::normalize_name(name)?;
        if !expense_names.contains(&name) {
            return Err(LedgerError::validation(format!(
                "'{}' is not an expense category",
                name
            )));
        }
        wanted.insert(name, checked_amount(*amount)?);
    }

    let mut batch = Batch::new();
    let mut saved = Vec::with_capacity(expense_names.len());
    for name in &expense_names {
        let amount = wanted.get(name).copied().unwrap_or(Decimal::ZERO);
        let budget = budget_for(session, name, year, month, amount);
        batch.set(Collection::Budgets, budget.id.clone(), encode(&budget)?);
        saved.push(budget);
    }
    store.commit(batch)?;
    info!(year, month, count = saved.len(), "month budgets saved");
    Ok(saved)
}

pub fn list(
    store: &dyn LedgerStore,
    session: &Session,
    year: i32,
    month: u32,
) -> LedgerResult<Vec<Budget>> {
    let query = session
        .scoped(Collection::Budgets)
        .where_eq("year", year)
        .where_eq("month", month);
    let mut budgets = store
        .query(&query)?
        .into_iter()
        .map(|doc| doc.decode::<Budget>().map_err(LedgerError::from))
        .collect::<LedgerResult<Vec<_>>>()?;
    budgets.sort_by(|a, b| a.category_name.cmp(&b.category_name));
    Ok(budgets)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub category: String,
    pub spent: Decimal,
    pub budget: Decimal,
}

impl BudgetProgress {
    pub fn percent(&self) -> Decimal {
        if self.budget.is_zero() {
            return Decimal::ZERO;
        }
        self.spent / self.budget * Decimal::ONE_HUNDRED
    }

    pub fn is_over(&self) -> bool {
        self.spent > self.budget
    }
}

/// Spending against every non-zero budget of the month.
pub fn progress(
    store: &dyn LedgerStore,
    session: &Session,
    year: i32,
    month: u32,
) -> LedgerResult<Vec<BudgetProgress>> {
    let (start, end) = month_bounds(year, month)?;
    let query = session
        .scoped(Collection::Transactions)
        .where_eq("type", TxKind::Expense.as_str())
        .filter("createdAt", Op::Gte, start_of_day(start).to_rfc3339())
        .filter("createdAt", Op::Lt, start_of_day(end).to_rfc3339());
    let mut spent: BTreeMap<String, Decimal> = BTreeMap::new();
    for doc in store.query(&query)? {
        let tx: Transaction = doc.decode()?;
        *spent.entry(tx.category).or_default() += tx.amount;
    }
    Ok(list(store, session, year, month)?
        .into_iter()
        .filter(|b| b.amount > Decimal::ZERO)
        .map(|b| BudgetProgress {
            spent: spent.get(&b.category_name).copied().unwrap_or_default(),
            category: b.category_name,
            budget: b.amount,
        })
        .collect())
}
