// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Next-month cash projection: fixed bills, recent variable spending and
//! hand-entered lines.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    BillStatus, Forecast, ForecastLine, LineSource, ScheduledTransaction, Transaction, TxKind,
};
use crate::money::round_cents;
use crate::session::Session;
use crate::store::{encode, Batch, Collection, LedgerStore};

use super::transactions::TRANSFER_CATEGORY;
use super::{load_all, month_bounds};

const AVERAGE_WINDOW_MONTHS: u32 = 3;
const VARIABLE_LINES: usize = 5;
const AVERAGE_PREFIX: &str = "Average: ";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAverage {
    pub category: String,
    pub amount: Decimal,
}

/// Average monthly spending per category over the three months before
/// `as_of`, largest first. Transfers between accounts are not spending.
pub fn average_spending(transactions: &[Transaction], as_of: NaiveDate) -> Vec<CategoryAverage> {
    let since = as_of
        .checked_sub_months(Months::new(AVERAGE_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MIN);
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in transactions {
        let day = tx.created_at.date_naive();
        if tx.kind != TxKind::Expense || tx.category == TRANSFER_CATEGORY {
            continue;
        }
        if day > since && day <= as_of {
            *totals.entry(tx.category.as_str()).or_default() += tx.amount;
        }
    }
    let divisor = Decimal::from(AVERAGE_WINDOW_MONTHS);
    let mut out: Vec<CategoryAverage> = totals
        .into_iter()
        .map(|(category, total)| CategoryAverage {
            category: category.to_string(),
            amount: round_cents(total / divisor),
        })
        .collect();
    out.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    out
}

#[derive(Debug, Clone)]
pub struct ForecastInput {
    /// Any day of the forecast month.
    pub month: NaiveDate,
    pub as_of: NaiveDate,
    pub manual_incomes: Vec<ForecastLine>,
    pub manual_expenses: Vec<ForecastLine>,
    /// Bill ids left out of the fixed expenses.
    pub excluded_bills: BTreeSet<String>,
}

fn keep_line(line: &ForecastLine) -> bool {
    !line.description.trim().is_empty() && line.amount > Decimal::ZERO
}

fn by_amount_desc(lines: &mut [ForecastLine]) {
    lines.sort_by(|a, b| b.amount.cmp(&a.amount));
}

/// Builds the forecast without touching the store.
pub fn project(
    user_id: &str,
    input: &ForecastInput,
    bills: &[ScheduledTransaction],
    transactions: &[Transaction],
) -> LedgerResult<Forecast> {
    let (start, end) = month_bounds(input.month.year(), input.month.month())?;

    let manual_expenses: Vec<ForecastLine> = input
        .manual_expenses
        .iter()
        .filter(|l| keep_line(l))
        .cloned()
        .collect();
    let overridden: BTreeSet<String> = manual_expenses
        .iter()
        .map(|l| {
            l.description
                .trim()
                .trim_start_matches(AVERAGE_PREFIX)
                .to_lowercase()
        })
        .collect();

    let mut expenses: Vec<ForecastLine> = bills
        .iter()
        .filter(|b| {
            b.status == BillStatus::Pending
                && b.due_date >= start
                && b.due_date < end
                && !input.excluded_bills.contains(&b.id)
        })
        .map(|b| ForecastLine {
            description: b.description.clone(),
            amount: b.amount,
            source: LineSource::Fixed,
        })
        .collect();
    expenses.extend(
        average_spending(transactions, input.as_of)
            .into_iter()
            .filter(|avg| !overridden.contains(&avg.category.to_lowercase()))
            .take(VARIABLE_LINES)
            .map(|avg| ForecastLine {
                description: format!("{}{}", AVERAGE_PREFIX, avg.category),
                amount: avg.amount,
                source: LineSource::Variable,
            }),
    );
    expenses.extend(manual_expenses);
    by_amount_desc(&mut expenses);

    let mut incomes: Vec<ForecastLine> = input
        .manual_incomes
        .iter()
        .filter(|l| keep_line(l))
        .cloned()
        .collect();
    by_amount_desc(&mut incomes);

    Ok(totals(Forecast {
        id: String::new(),
        user_id: user_id.to_string(),
        forecast_month: start,
        predicted_incomes: incomes,
        predicted_expenses: expenses,
        total_income: Decimal::ZERO,
        total_expense: Decimal::ZERO,
        predicted_balance: Decimal::ZERO,
        created_at: Utc::now(),
    }))
}

fn totals(mut forecast: Forecast) -> Forecast {
    forecast.total_income = forecast.predicted_incomes.iter().map(|l| l.amount).sum();
    forecast.total_expense = forecast.predicted_expenses.iter().map(|l| l.amount).sum();
    forecast.predicted_balance = forecast.total_income - forecast.total_expense;
    forecast
}

/// Loads bills and transactions for the session user and projects them.
pub fn build(
    store: &dyn LedgerStore,
    session: &Session,
    input: &ForecastInput,
) -> LedgerResult<Forecast> {
    let bills: Vec<ScheduledTransaction> =
        load_all(store, session, Collection::ScheduledTransactions)?;
    let transactions: Vec<Transaction> = load_all(store, session, Collection::Transactions)?;
    project(session.user_id(), input, &bills, &transactions)
}

/// Stores a forecast. Blank or non-positive lines are dropped and the totals
/// recomputed from what remains.
pub fn save(store: &dyn LedgerStore, session: &Session, forecast: Forecast) -> LedgerResult<Forecast> {
    if forecast.user_id != session.user_id() {
        return Err(LedgerError::validation("forecast belongs to another user"));
    }
    let mut forecast = forecast;
    forecast.predicted_incomes.retain(keep_line);
    forecast.predicted_expenses.retain(keep_line);
    let mut forecast = totals(forecast);
    forecast.id = store.new_id();
    forecast.created_at = Utc::now();

    let mut batch = Batch::new();
    batch.insert(Collection::Forecasts, forecast.id.clone(), encode(&forecast)?);
    store.commit(batch)?;
    info!(id = %forecast.id, month = %forecast.forecast_month, balance = %forecast.predicted_balance, "forecast saved");
    Ok(forecast)
}

/// Saved forecasts, newest month first.
pub fn list(store: &dyn LedgerStore, session: &Session) -> LedgerResult<Vec<Forecast>> {
    let mut forecasts: Vec<Forecast> = load_all(store, session, Collection::Forecasts)?;
    forecasts.sort_by(|a, b| {
        b.forecast_month
            .cmp(&a.forecast_month)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    Ok(forecasts)
}
