// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure summaries over a set of transactions.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Transaction, TxKind};

/// Keeps transactions whose date falls within `[from, to]`, both inclusive.
pub fn filter_by_date(
    transactions: &[Transaction],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| {
            let day = t.created_at.date_naive();
            from.is_none_or(|f| day >= f) && to.is_none_or(|end| day <= end)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
}

pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();
    for tx in transactions {
        match tx.kind {
            TxKind::Income => summary.total_income += tx.amount,
            TxKind::Expense => summary.total_expense += tx.amount,
        }
    }
    summary.balance = summary.total_income - summary.total_expense;
    summary
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthFlow {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
}

/// Income and expense per `YYYY-MM`, oldest month first.
pub fn monthly_flow(transactions: &[Transaction]) -> Vec<MonthFlow> {
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for tx in transactions {
        let entry = months
            .entry(tx.created_at.format("%Y-%m").to_string())
            .or_default();
        match tx.kind {
            TxKind::Income => entry.0 += tx.amount,
            TxKind::Expense => entry.1 += tx.amount,
        }
    }
    months
        .into_iter()
        .map(|(month, (income, expense))| MonthFlow {
            month,
            income,
            expense,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: Decimal,
}

/// Running net balance at the end of each day that has activity.
pub fn balance_evolution(transactions: &[Transaction]) -> Vec<BalancePoint> {
    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for tx in transactions {
        *daily.entry(tx.created_at.date_naive()).or_default() += tx.signed_amount();
    }
    let mut running = Decimal::ZERO;
    daily
        .into_iter()
        .map(|(date, net)| {
            running += net;
            BalancePoint {
                date,
                balance: running,
            }
        })
        .collect()
}

/// Expense totals per category, largest first.
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<(String, Decimal)> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.kind == TxKind::Expense) {
        *totals.entry(tx.category.as_str()).or_default() += tx.amount;
    }
    let mut out: Vec<(String, Decimal)> = totals
        .into_iter()
        .map(|(c, v)| (c.to_string(), v))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// The `n` largest single expenses.
pub fn expense_ranking(transactions: &[Transaction], n: usize) -> Vec<Transaction> {
    let mut expenses: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.kind == TxKind::Expense)
        .cloned()
        .collect();
    expenses.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| b.created_at.cmp(&a.created_at)));
    expenses.truncate(n);
    expenses
}
