// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeZone, Utc};
use oikonomos::ledger::forecast::{self, ForecastInput};
use oikonomos::ledger::transactions::{self, NewTransaction};
use oikonomos::ledger::{accounts, doctor, projector, reports};
use oikonomos::models::{
    Account, BillStatus, ForecastLine, LineSource, ScheduledTransaction, Transaction, TxKind,
};
use oikonomos::session::Session;
use oikonomos::store::{Collection, LedgerStore, MemoryStore, Patch};
use rust_decimal::Decimal;
use serde_json::json;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn day(y: i32, m: u32, dd: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, dd).unwrap()
}

fn tx(id: &str, kind: TxKind, amount: &str, category: &str, account: Option<&str>, on: NaiveDate) -> Transaction {
    Transaction {
        id: id.into(),
        user_id: "u1".into(),
        amount: d(amount),
        kind,
        category: category.into(),
        account_id: account.map(str::to_string),
        description: None,
        created_at: Utc.from_utc_datetime(&on.and_hms_opt(12, 0, 0).unwrap()),
    }
}

fn account(id: &str) -> Account {
    Account {
        id: id.into(),
        user_id: "u1".into(),
        account_name: id.to_uppercase(),
        balance: Decimal::ZERO,
        is_reserve: false,
        is_default: false,
        created_at: Utc::now(),
    }
}

fn history() -> Vec<Transaction> {
    vec![
        tx("t1", TxKind::Income, "3000", "salary", Some("a"), day(2025, 1, 5)),
        tx("t2", TxKind::Expense, "450.50", "rent", Some("a"), day(2025, 1, 10)),
        tx("t3", TxKind::Expense, "80", "food", Some("a"), day(2025, 1, 10)),
        tx("t4", TxKind::Expense, "120", "food", Some("b"), day(2025, 2, 2)),
        tx("t5", TxKind::Income, "200", "gift", Some("b"), day(2025, 2, 14)),
        tx("t6", TxKind::Expense, "15", "food", None, day(2025, 2, 20)),
        tx("t7", TxKind::Expense, "60", "fun", Some("ghost"), day(2025, 3, 1)),
    ]
}

#[test]
fn projection_is_order_independent() {
    let accounts = vec![account("a"), account("b")];
    let txs = history();
    let forward = projector::project_balances(&accounts, &txs);
    let mut reversed = txs.clone();
    reversed.reverse();
    let backward = projector::project_balances(&accounts, &reversed);
    assert_eq!(forward, backward);

    assert_eq!(forward["a"], d("2469.50"));
    assert_eq!(forward["b"], d("80"));
    // unassigned and unknown-account rows are ignored
    assert_eq!(forward.len(), 2);
    assert_eq!(projector::total(forward.values()), d("2549.50"));
}

#[test]
fn summary_and_date_filter() {
    let txs = history();
    let s = reports::summarize(&txs);
    assert_eq!(s.total_income, d("3200"));
    assert_eq!(s.total_expense, d("725.50"));
    assert_eq!(s.balance, d("2474.50"));

    let feb = reports::filter_by_date(&txs, Some(day(2025, 2, 1)), Some(day(2025, 2, 14)));
    let ids: Vec<&str> = feb.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t4", "t5"]);
    assert_eq!(reports::filter_by_date(&txs, None, None).len(), txs.len());
}

#[test]
fn monthly_flow_and_evolution() {
    let txs = history();
    let flow = reports::monthly_flow(&txs);
    let months: Vec<&str> = flow.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, vec!["2025-01", "2025-02", "2025-03"]);
    assert_eq!(flow[0].income, d("3000"));
    assert_eq!(flow[0].expense, d("530.50"));
    assert_eq!(flow[1].income, d("200"));
    assert_eq!(flow[1].expense, d("135"));

    let points = reports::balance_evolution(&txs);
    assert_eq!(points.len(), 6);
    assert_eq!(points[0].date, day(2025, 1, 5));
    assert_eq!(points[0].balance, d("3000"));
    assert_eq!(points[1].balance, d("2469.50"));
    assert_eq!(points.last().unwrap().balance, d("2474.50"));
}

#[test]
fn category_totals_and_ranking() {
    let txs = history();
    let by_cat = reports::expenses_by_category(&txs);
    assert_eq!(
        by_cat,
        vec![
            ("rent".to_string(), d("450.50")),
            ("food".to_string(), d("215")),
            ("fun".to_string(), d("60")),
        ]
    );

    let top = reports::expense_ranking(&txs, 2);
    let ids: Vec<&str> = top.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t2", "t4"]);
    assert_eq!(top[1].amount, d("120"));
}

fn bill(id: &str, desc: &str, amount: &str, due: NaiveDate, status: BillStatus) -> ScheduledTransaction {
    ScheduledTransaction {
        id: id.into(),
        user_id: "u1".into(),
        description: desc.into(),
        amount: d(amount),
        category_name: "utilities".into(),
        due_date: due,
        status,
        is_recurring: false,
        paid_at: None,
    }
}

fn line(desc: &str, amount: &str) -> ForecastLine {
    ForecastLine {
        description: desc.into(),
        amount: d(amount),
        source: LineSource::Manual,
    }
}

#[test]
fn averages_cover_three_months_and_skip_transfers() {
    let as_of = day(2025, 6, 15);
    let txs = vec![
        tx("f1", TxKind::Expense, "300", "food", Some("a"), day(2025, 5, 1)),
        tx("f2", TxKind::Expense, "150", "food", Some("a"), day(2025, 4, 1)),
        tx("f3", TxKind::Expense, "90", "fun", Some("a"), day(2025, 6, 15)),
        tx("f4", TxKind::Expense, "999", "food", Some("a"), day(2025, 3, 15)),
        tx("f5", TxKind::Expense, "500", "transfer", Some("a"), day(2025, 5, 5)),
        tx("f6", TxKind::Income, "4000", "salary", Some("a"), day(2025, 5, 5)),
        tx("f7", TxKind::Expense, "10", "misc", Some("a"), day(2025, 6, 16)),
        tx("f8", TxKind::Expense, "100", "taxi", Some("a"), day(2025, 5, 20)),
    ];
    let avgs = forecast::average_spending(&txs, as_of);
    let pairs: Vec<(&str, Decimal)> = avgs.iter().map(|a| (a.category.as_str(), a.amount)).collect();
    assert_eq!(
        pairs,
        vec![("food", d("150")), ("taxi", d("33.33")), ("fun", d("30"))]
    );
}

#[test]
fn forecast_combines_bills_averages_and_manual_lines() {
    let txs = vec![
        tx("f1", TxKind::Expense, "300", "food", Some("a"), day(2025, 5, 1)),
        tx("f2", TxKind::Expense, "150", "food", Some("a"), day(2025, 4, 1)),
        tx("f3", TxKind::Expense, "90", "fun", Some("a"), day(2025, 6, 10)),
    ];
    let bills = vec![
        bill("b1", "Internet", "100", day(2025, 7, 10), BillStatus::Pending),
        bill("b2", "Water", "45", day(2025, 7, 3), BillStatus::Paid),
        bill("b3", "Power", "70", day(2025, 8, 1), BillStatus::Pending),
        bill("b4", "Gym", "99", day(2025, 7, 20), BillStatus::Pending),
    ];
    let input = ForecastInput {
        month: day(2025, 7, 1),
        as_of: day(2025, 6, 15),
        manual_incomes: vec![line("Salary", "3000"), line("  ", "50")],
        manual_expenses: vec![line("food", "200"), line("Nothing", "0")],
        excluded_bills: BTreeSet::from(["b4".to_string()]),
    };

    let f = forecast::project("u1", &input, &bills, &txs).unwrap();
    assert_eq!(f.forecast_month, day(2025, 7, 1));
    let expenses: Vec<(&str, Decimal, LineSource)> = f
        .predicted_expenses
        .iter()
        .map(|l| (l.description.as_str(), l.amount, l.source))
        .collect();
    assert_eq!(
        expenses,
        vec![
            ("food", d("200"), LineSource::Manual),
            ("Internet", d("100"), LineSource::Fixed),
            ("Average: fun", d("30"), LineSource::Variable),
        ]
    );
    assert_eq!(f.predicted_incomes.len(), 1);
    assert_eq!(f.total_income, d("3000"));
    assert_eq!(f.total_expense, d("330"));
    assert_eq!(f.predicted_balance, d("2670"));
}

#[test]
fn saved_forecast_drops_blank_lines() {
    let store = MemoryStore::new();
    let session = Session::new("u1");
    let input = ForecastInput {
        month: day(2025, 9, 1),
        as_of: day(2025, 8, 15),
        manual_incomes: vec![line("Salary", "1000")],
        manual_expenses: vec![],
        excluded_bills: BTreeSet::new(),
    };
    let mut f = forecast::build(&store, &session, &input).unwrap();
    f.predicted_expenses.push(line("", "20"));
    f.predicted_expenses.push(line("Rent", "400"));

    let saved = forecast::save(&store, &session, f).unwrap();
    assert!(!saved.id.is_empty());
    assert_eq!(saved.predicted_expenses.len(), 1);
    assert_eq!(saved.total_expense, d("400"));
    assert_eq!(saved.predicted_balance, d("600"));

    let listed = forecast::list(&store, &session).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, saved.id);
}

#[test]
fn doctor_finds_and_fixes_drift() {
    let store = MemoryStore::new();
    let session = Session::new("u1");
    let a = accounts::create(&store, &session, "Wallet", false).unwrap();
    transactions::create(
        &store,
        &session,
        NewTransaction {
            kind: TxKind::Income,
            amount: d("100"),
            category: "salary".into(),
            account_id: a.id.clone(),
            description: None,
            date: None,
        },
    )
    .unwrap();
    assert!(doctor::check(&store, &session).unwrap().is_empty());

    store
        .update(Collection::Accounts, &a.id, Patch::new().set("balance", json!("5")))
        .unwrap();
    let drifts = doctor::check(&store, &session).unwrap();
    assert_eq!(drifts.len(), 1);
    assert_eq!(drifts[0].stored, d("5"));
    assert_eq!(drifts[0].projected, d("100"));
    assert_eq!(drifts[0].difference(), d("-95"));

    doctor::fix(&store, &session).unwrap();
    assert!(doctor::check(&store, &session).unwrap().is_empty());
    let doc = store.get(Collection::Accounts, &a.id).unwrap().unwrap();
    assert_eq!(doc.data["balance"], "100");
}
