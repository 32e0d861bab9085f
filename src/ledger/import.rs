// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! CSV transaction import. Rows are validated one by one; the valid ones are
//! written together with their balance adjustments in a single batch.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;

use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Category, Transaction, TxKind};
use crate::money::parse_amount;
use crate::session::Session;
use crate::store::{encode, Batch, Collection, LedgerStore, Patch};

use super::{load_all, start_of_day};

/// Lowercases and strips accents, so `Alimentação` matches `alimentacao`.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub imported: Vec<Transaction>,
    pub errors: Vec<ImportError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Date,
    Type,
    Amount,
    Category,
    Account,
    Description,
}

fn column_for(header: &str) -> Option<Column> {
    match normalize(header).as_str() {
        "date" | "data" => Some(Column::Date),
        "type" | "tipo" => Some(Column::Type),
        "amount" | "valor" => Some(Column::Amount),
        "category" | "categoria" => Some(Column::Category),
        "account" | "conta" => Some(Column::Account),
        "description" | "descricao" => Some(Column::Description),
        _ => None,
    }
}

fn kind_for(value: &str) -> Option<TxKind> {
    match normalize(value).as_str() {
        "income" | "renda" => Some(TxKind::Income),
        "expense" | "despesa" => Some(TxKind::Expense),
        _ => None,
    }
}

fn parse_when(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(start_of_day(d));
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

struct Row<'a> {
    record: &'a StringRecord,
    columns: &'a HashMap<Column, usize>,
}

impl Row<'_> {
    fn get(&self, wanted: Column) -> &str {
        self.columns
            .get(&wanted)
            .and_then(|idx| self.record.get(*idx))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Validates CSV rows against the user's categories and accounts without
/// writing anything.
pub fn parse_csv<R: Read>(
    reader: R,
    user_id: &str,
    categories: &[Category],
    accounts: &[Account],
) -> LedgerResult<ImportReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .map_err(|e| LedgerError::validation(format!("unreadable CSV header: {}", e)))?
        .clone();
    let mut columns: HashMap<Column, usize> = HashMap::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(column) = column_for(header) {
            columns.entry(column).or_insert(i);
        }
    }

    let category_map: HashMap<String, &Category> =
        categories.iter().map(|c| (normalize(&c.name), c)).collect();
    let account_map: HashMap<String, &Account> = accounts
        .iter()
        .map(|a| (normalize(&a.account_name), a))
        .collect();

    let mut report = ImportReport::default();
    let mut rows = 0usize;
    for (i, result) in rdr.records().enumerate() {
        let fallback_line = i as u64 + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                report.errors.push(ImportError {
                    line: fallback_line,
                    message: format!("unreadable row: {}", e),
                });
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows += 1;
        let line = record.position().map_or(fallback_line, |p| p.line());
        let row = Row {
            record: &record,
            columns: &columns,
        };
        match validate_row(&row, user_id, &category_map, &account_map) {
            Ok(tx) => report.imported.push(tx),
            Err(message) => report.errors.push(ImportError { line, message }),
        }
    }
    if rows == 0 {
        report.errors.push(ImportError {
            line: 1,
            message: "CSV file is empty or only has a header".into(),
        });
    }
    Ok(report)
}

fn validate_row(
    row: &Row<'_>,
    user_id: &str,
    categories: &HashMap<String, &Category>,
    accounts: &HashMap<String, &Account>,
) -> Result<Transaction, String> {
    let raw_date = row.get(Column::Date);
    let created_at = parse_when(raw_date)
        .ok_or_else(|| format!("invalid date '{}', use YYYY-MM-DD", raw_date))?;

    let raw_type = row.get(Column::Type);
    let kind = kind_for(raw_type)
        .ok_or_else(|| format!("invalid type '{}', use income or expense", raw_type))?;

    let raw_amount = row.get(Column::Amount);
    let amount = parse_amount(raw_amount)
        .ok()
        .filter(|a| *a > Decimal::ZERO)
        .ok_or_else(|| format!("invalid or zero amount '{}'", raw_amount))?;

    let raw_category = row.get(Column::Category);
    let category = categories
        .get(&normalize(raw_category))
        .filter(|c| c.kind == kind)
        .ok_or_else(|| {
            format!(
                "category '{}' not found or its type does not match",
                raw_category
            )
        })?;

    let raw_account = row.get(Column::Account);
    let account = accounts
        .get(&normalize(raw_account))
        .ok_or_else(|| format!("account '{}' not found", raw_account))?;

    let description = row.get(Column::Description);
    Ok(Transaction {
        id: String::new(),
        user_id: user_id.to_string(),
        amount,
        kind,
        category: category.name.clone(),
        account_id: Some(account.id.clone()),
        description: (!description.is_empty()).then(|| description.to_string()),
        created_at,
    })
}

/// Parses `reader` and commits every valid row in one batch. Invalid rows are
/// reported and skipped.
pub fn import_csv<R: Read>(
    store: &dyn LedgerStore,
    session: &Session,
    reader: R,
) -> LedgerResult<ImportReport> {
    let categories: Vec<Category> = load_all(store, session, Collection::Categories)?;
    let accounts: Vec<Account> = load_all(store, session, Collection::Accounts)?;
    let mut report = parse_csv(reader, session.user_id(), &categories, &accounts)?;
    for err in &report.errors {
        warn!(line = err.line, message = %err.message, "import row rejected");
    }
    if report.imported.is_empty() {
        return Ok(report);
    }

    let mut batch = Batch::new();
    let mut deltas: BTreeMap<String, Decimal> = BTreeMap::new();
    for tx in &mut report.imported {
        tx.id = store.new_id();
        batch.insert(Collection::Transactions, tx.id.clone(), encode(&*tx)?);
        if let Some(account_id) = &tx.account_id {
            *deltas.entry(account_id.clone()).or_default() += tx.signed_amount();
        }
    }
    for (account_id, delta) in deltas {
        batch.update(
            Collection::Accounts,
            account_id,
            Patch::new().increment("balance", delta),
        );
    }
    store.commit(batch)?;
    info!(
        imported = report.imported.len(),
        rejected = report.errors.len(),
        "CSV import committed"
    );
    Ok(report)
}
