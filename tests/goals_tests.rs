// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use oikonomos::error::LedgerError;
use oikonomos::ledger::goals::{self, Destination, GoalEdit, NewGoal};
use oikonomos::ledger::transactions::{self, NewTransaction, TransactionFilter};
use oikonomos::ledger::{accounts, projector};
use oikonomos::models::{Account, Goal, TxKind};
use oikonomos::session::Session;
use oikonomos::store::{Collection, LedgerStore, MemoryStore, Patch};
use rust_decimal::Decimal;
use serde_json::json;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (MemoryStore, Session) {
    (MemoryStore::new(), Session::new("u1"))
}

fn funded(store: &dyn LedgerStore, session: &Session, name: &str, amount: &str) -> Account {
    let account = accounts::create(store, session, name, false).unwrap();
    transactions::create(
        store,
        session,
        NewTransaction {
            kind: TxKind::Income,
            amount: d(amount),
            category: "salary".into(),
            account_id: account.id.clone(),
            description: None,
            date: None,
        },
    )
    .unwrap();
    account
}

fn goal(store: &dyn LedgerStore, session: &Session, name: &str, target: &str) -> Goal {
    goals::create(
        store,
        session,
        NewGoal {
            goal_name: name.into(),
            target_amount: d(target),
            target_date: None,
        },
    )
    .unwrap()
}

fn stored_balance(store: &dyn LedgerStore, id: &str) -> Decimal {
    let doc = store.get(Collection::Accounts, id).unwrap().unwrap();
    doc.data["balance"].as_str().unwrap().parse().unwrap()
}

#[test]
fn contribute_moves_money_into_goal() {
    let (store, session) = setup();
    let account = funded(&store, &session, "Checking", "300");
    let trip = goal(&store, &session, "Trip", "1000");

    let c = goals::contribute(&store, &session, &trip.id, d("120"), &account.id).unwrap();
    assert_eq!(c.goal.saved_amount, d("120"));
    assert_eq!(c.transaction.kind, TxKind::Expense);
    assert_eq!(
        c.transaction.description.as_deref(),
        Some("Contribution to goal: Trip")
    );
    assert_eq!(stored_balance(&store, &account.id), d("180"));
    assert_eq!(
        projector::recomputed_balance(&store, &session, &account.id).unwrap(),
        d("180")
    );

    let stored = goals::resolve(&store, &session, "trip").unwrap();
    assert_eq!(stored.saved_amount, d("120"));
    assert_eq!(stored.progress(), d("12"));
    assert!(!stored.is_reached());
}

#[test]
fn contribute_beyond_balance_is_rejected() {
    let (store, session) = setup();
    let account = funded(&store, &session, "Checking", "50");
    let trip = goal(&store, &session, "Trip", "1000");

    let err = goals::contribute(&store, &session, &trip.id, d("80"), &account.id).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(
        goals::resolve(&store, &session, &trip.id).unwrap().saved_amount,
        Decimal::ZERO
    );
    assert_eq!(stored_balance(&store, &account.id), d("50"));

    let zero = goals::contribute(&store, &session, &trip.id, Decimal::ZERO, &account.id);
    assert!(matches!(zero, Err(LedgerError::Validation(_))));
}

#[test]
fn complete_into_new_reserve_account() {
    let (store, session) = setup();
    let account = funded(&store, &session, "Checking", "500");
    let trip = goal(&store, &session, "Trip", "1000");
    goals::contribute(&store, &session, &trip.id, d("500"), &account.id).unwrap();

    let done = goals::complete(
        &store,
        &session,
        &trip.id,
        Destination::NewAccount { reserve: true },
    )
    .unwrap();
    assert!(done.created_account);
    assert_eq!(done.account.account_name, "Trip");
    assert!(done.account.is_reserve);
    assert_eq!(stored_balance(&store, &done.account.id), d("500"));
    assert_eq!(
        projector::recomputed_balance(&store, &session, &done.account.id).unwrap(),
        d("500")
    );

    let filter = TransactionFilter {
        account_id: Some(done.account.id.clone()),
        ..Default::default()
    };
    let txs = transactions::list(&store, &session, &filter).unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].kind, TxKind::Income);
    assert_eq!(txs[0].amount, d("500"));
    assert_eq!(txs[0].description.as_deref(), Some("Goal completed: Trip"));

    assert!(goals::list(&store, &session).unwrap().is_empty());
}

#[test]
fn complete_into_existing_account() {
    let (store, session) = setup();
    let checking = funded(&store, &session, "Checking", "200");
    let savings = accounts::create(&store, &session, "Savings", true).unwrap();
    let car = goal(&store, &session, "Car", "150");
    goals::contribute(&store, &session, &car.id, d("150"), &checking.id).unwrap();
    assert!(goals::resolve(&store, &session, "car").unwrap().is_reached());

    let done = goals::complete(
        &store,
        &session,
        &car.id,
        Destination::Existing(savings.id.clone()),
    )
    .unwrap();
    assert!(!done.created_account);
    assert_eq!(done.account.balance, d("150"));
    assert_eq!(stored_balance(&store, &savings.id), d("150"));
    assert_eq!(stored_balance(&store, &checking.id), d("50"));
    assert_eq!(store.count(Collection::Accounts).unwrap(), 2);
    assert_eq!(store.count(Collection::Goals).unwrap(), 0);
}

#[test]
fn complete_without_savings_is_rejected() {
    let (store, session) = setup();
    let empty = goal(&store, &session, "Bike", "800");
    let err = goals::complete(
        &store,
        &session,
        &empty.id,
        Destination::NewAccount { reserve: false },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(store.count(Collection::Goals).unwrap(), 1);
    assert_eq!(store.count(Collection::Accounts).unwrap(), 0);
}

#[test]
fn edit_and_delete_goal() {
    let (store, session) = setup();
    let g = goal(&store, &session, "Laptop", "3000");
    let edited = goals::edit(
        &store,
        &session,
        &g.id,
        GoalEdit {
            target_amount: Some(d("2500")),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(edited.target_amount, d("2500"));
    assert!(matches!(
        goals::edit(&store, &session, &g.id, GoalEdit::default()),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        goals::create(
            &store,
            &session,
            NewGoal {
                goal_name: "Nothing".into(),
                target_amount: Decimal::ZERO,
                target_date: None,
            }
        ),
        Err(LedgerError::Validation(_))
    ));

    goals::delete(&store, &session, &g.id).unwrap();
    assert!(matches!(
        goals::resolve(&store, &session, "laptop"),
        Err(LedgerError::NotFound { .. })
    ));
}

#[test]
fn contribute_with_stale_stored_balance_is_rejected() {
    let (store, session) = setup();
    let account = funded(&store, &session, "Checking", "200");
    let trip = goal(&store, &session, "Trip", "1000");
    // history says 200, but the stored balance has since dropped to 30
    store
        .update(Collection::Accounts, &account.id, Patch::new().set("balance", json!("30")))
        .unwrap();
    let before = store.count(Collection::Transactions).unwrap();

    let err = goals::contribute(&store, &session, &trip.id, d("50"), &account.id).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(store.count(Collection::Transactions).unwrap(), before);
    assert_eq!(stored_balance(&store, &account.id), d("30"));
    assert_eq!(
        goals::resolve(&store, &session, &trip.id).unwrap().saved_amount,
        Decimal::ZERO
    );
}

#[test]
fn complete_into_new_account_needs_a_free_name() {
    let (store, session) = setup();
    let account = funded(&store, &session, "Trip", "300");
    let trip = goal(&store, &session, "trip", "1000");
    goals::contribute(&store, &session, &trip.id, d("100"), &account.id).unwrap();

    let err = goals::complete(
        &store,
        &session,
        &trip.id,
        Destination::NewAccount { reserve: false },
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let names: Vec<String> = accounts::list(&store, &session, &Default::default())
        .unwrap()
        .into_iter()
        .map(|a| a.account_name)
        .collect();
    assert_eq!(names, vec!["Trip"]);
    assert_eq!(
        goals::resolve(&store, &session, &trip.id).unwrap().saved_amount,
        d("100")
    );
    assert_eq!(stored_balance(&store, &account.id), d("200"));
}
