// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, TimeZone, Utc};
use oikonomos::error::LedgerError;
use oikonomos::ledger::accounts::{self, AccountEdit, AccountFilter, AccountKind};
use oikonomos::ledger::bills::{self, NewBill};
use oikonomos::ledger::transactions::{self, NewTransaction, TransactionFilter, TransferRequest};
use oikonomos::ledger::{budgets, categories};
use oikonomos::models::{Budget, TxKind};
use oikonomos::session::Session;
use oikonomos::store::{Collection, LedgerStore, MemoryStore};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (MemoryStore, Session) {
    (MemoryStore::new(), Session::new("u1"))
}

fn income(store: &MemoryStore, session: &Session, account_id: &str, amount: &str) {
    transactions::create(
        store,
        session,
        NewTransaction {
            kind: TxKind::Income,
            amount: d(amount),
            category: "salary".into(),
            account_id: account_id.to_string(),
            description: None,
            date: None,
        },
    )
    .unwrap();
}

#[test]
fn account_names_are_unique_ignoring_case() {
    let (store, session) = setup();
    accounts::create(&store, &session, "Checking", false).unwrap();
    let dup = accounts::create(&store, &session, "checking", false);
    assert!(matches!(dup, Err(LedgerError::Validation(_))));
    let blank = accounts::create(&store, &session, "   ", false);
    assert!(matches!(blank, Err(LedgerError::Validation(_))));

    // another user may reuse the name
    accounts::create(&store, &Session::new("u2"), "Checking", false).unwrap();
}

#[test]
fn list_uses_projected_balances_and_filters() {
    let (store, session) = setup();
    let checking = accounts::create(&store, &session, "Checking", false).unwrap();
    let savings = accounts::create(&store, &session, "savings box", true).unwrap();
    income(&store, &session, &checking.id, "250");
    income(&store, &session, &savings.id, "75");

    let all = accounts::list(&store, &session, &AccountFilter::default()).unwrap();
    let names: Vec<&str> = all.iter().map(|a| a.account_name.as_str()).collect();
    assert_eq!(names, vec!["Checking", "savings box"]);
    assert_eq!(all[0].balance, d("250"));

    let reserve = accounts::list(
        &store,
        &session,
        &AccountFilter {
            kind: AccountKind::Reserve,
            search: None,
        },
    )
    .unwrap();
    assert_eq!(reserve.len(), 1);
    assert_eq!(reserve[0].balance, d("75"));

    let search = accounts::list(
        &store,
        &session,
        &AccountFilter {
            kind: AccountKind::All,
            search: Some("CHECK".into()),
        },
    )
    .unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].id, checking.id);
}

#[test]
fn only_one_default_account() {
    let (store, session) = setup();
    let a = accounts::create(&store, &session, "A", false).unwrap();
    let b = accounts::create(&store, &session, "B", false).unwrap();
    assert!(accounts::default_account(&store, &session).unwrap().is_none());

    accounts::set_default(&store, &session, &a.id).unwrap();
    accounts::set_default(&store, &session, &b.id).unwrap();
    let current = accounts::default_account(&store, &session).unwrap().unwrap();
    assert_eq!(current.id, b.id);
    let a_doc = store.get(Collection::Accounts, &a.id).unwrap().unwrap();
    assert_eq!(a_doc.data["isDefault"], false);
}

#[test]
fn delete_requires_zero_balance() {
    let (store, session) = setup();
    let a = accounts::create(&store, &session, "A", false).unwrap();
    let b = accounts::create(&store, &session, "B", false).unwrap();
    income(&store, &session, &a.id, "30");

    let err = accounts::delete(&store, &session, &a.id).unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    transactions::transfer(
        &store,
        &session,
        TransferRequest {
            from: a.id.clone(),
            to: b.id.clone(),
            amount: d("30"),
            description: None,
            date: None,
        },
    )
    .unwrap();
    accounts::delete(&store, &session, &a.id).unwrap();
    assert!(matches!(
        accounts::resolve(&store, &session, "a"),
        Err(LedgerError::NotFound { .. })
    ));
}

#[test]
fn edit_account_name_and_reserve_flag() {
    let (store, session) = setup();
    let a = accounts::create(&store, &session, "Old", false).unwrap();
    accounts::create(&store, &session, "Taken", false).unwrap();

    let clash = accounts::edit(
        &store,
        &session,
        &a.id,
        AccountEdit {
            account_name: Some("taken".into()),
            is_reserve: None,
        },
    );
    assert!(matches!(clash, Err(LedgerError::Validation(_))));

    let edited = accounts::edit(
        &store,
        &session,
        &a.id,
        AccountEdit {
            account_name: Some("New".into()),
            is_reserve: Some(true),
        },
    )
    .unwrap();
    assert_eq!(edited.account_name, "New");
    let found = accounts::resolve(&store, &session, "new").unwrap();
    assert!(found.is_reserve);
}

#[test]
fn category_names_are_normalized() {
    let (store, session) = setup();
    let c = categories::create(&store, &session, "  Groceries ", TxKind::Expense).unwrap();
    assert_eq!(c.name, "groceries");
    assert!(matches!(
        categories::create(&store, &session, "GROCERIES", TxKind::Expense),
        Err(LedgerError::Validation(_))
    ));
    categories::create(&store, &session, "salary", TxKind::Income).unwrap();

    let expense = categories::list(&store, &session, Some(TxKind::Expense)).unwrap();
    assert_eq!(expense.len(), 1);
    assert_eq!(categories::list(&store, &session, None).unwrap().len(), 2);
    assert!(categories::find(&store, &session, "Groceries").unwrap().is_some());
}

#[test]
fn rename_category_rewrites_references() {
    let (store, session) = setup();
    let cat = categories::create(&store, &session, "market", TxKind::Expense).unwrap();
    let account = accounts::create(&store, &session, "Wallet", false).unwrap();
    income(&store, &session, &account.id, "100");
    transactions::create(
        &store,
        &session,
        NewTransaction {
            kind: TxKind::Expense,
            amount: d("12"),
            category: "market".into(),
            account_id: account.id.clone(),
            description: None,
            date: Some(Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap()),
        },
    )
    .unwrap();
    let bill = bills::create(
        &store,
        &session,
        NewBill {
            description: "Weekly box".into(),
            amount: d("40"),
            category_name: "market".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            is_recurring: true,
        },
    )
    .unwrap();
    budgets::save(&store, &session, "market", 2025, 2, d("200")).unwrap();

    let renamed = categories::rename(&store, &session, &cat.id, "Supermarket").unwrap();
    assert_eq!(renamed.name, "supermarket");

    let filter = TransactionFilter {
        category: Some("supermarket".into()),
        ..Default::default()
    };
    assert_eq!(transactions::list(&store, &session, &filter).unwrap().len(), 1);

    let bill_doc = store
        .get(Collection::ScheduledTransactions, &bill.id)
        .unwrap()
        .unwrap();
    assert_eq!(bill_doc.data["categoryName"], "supermarket");

    let old_key = Budget::doc_id("u1", 2025, 2, "market");
    let new_key = Budget::doc_id("u1", 2025, 2, "supermarket");
    assert!(store.get(Collection::Budgets, &old_key).unwrap().is_none());
    let moved = budgets::list(&store, &session, 2025, 2).unwrap();
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].id, new_key);
    assert_eq!(moved[0].amount, d("200"));
}

#[test]
fn change_category_type_only() {
    let (store, session) = setup();
    let cat = categories::create(&store, &session, "refunds", TxKind::Expense).unwrap();
    let edited = categories::edit(&store, &session, &cat.id, None, Some(TxKind::Income)).unwrap();
    assert_eq!(edited.kind, TxKind::Income);
    assert!(matches!(
        categories::edit(&store, &session, &cat.id, None, None),
        Err(LedgerError::Validation(_))
    ));
    categories::delete(&store, &session, &cat.id).unwrap();
    assert!(categories::find(&store, &session, "refunds").unwrap().is_none());
}
