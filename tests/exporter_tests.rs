// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use oikonomos::cli;
use oikonomos::commands::{exporter, transactions as tx_cmd, Ctx};
use oikonomos::config::Config;
use oikonomos::ledger::accounts;
use oikonomos::ledger::transactions::{self, NewTransaction};
use oikonomos::models::TxKind;
use oikonomos::session::Session;
use oikonomos::store::MemoryStore;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn config() -> Config {
    Config {
        db_path: PathBuf::from(":memory:"),
        user_id: "u1".into(),
        currency_symbol: "R$".into(),
    }
}

fn setup() -> (MemoryStore, Session) {
    let store = MemoryStore::new();
    let session = Session::new("u1");
    let wallet = accounts::create(&store, &session, "Wallet", false).unwrap();
    for (day, kind, amount, category, description) in [
        (1, TxKind::Income, "1500", "salary", None),
        (3, TxKind::Expense, "42.5", "food", Some("Dinner")),
        (7, TxKind::Expense, "12", "transport", None),
    ] {
        transactions::create(
            &store,
            &session,
            NewTransaction {
                kind,
                amount: amount.parse::<Decimal>().unwrap(),
                category: category.into(),
                account_id: wallet.id.clone(),
                description: description.map(str::to_string),
                date: Some(Utc.with_ymd_and_hms(2025, 1, day, 8, 0, 0).unwrap()),
            },
        )
        .unwrap();
    }
    (store, session)
}

#[test]
fn export_json() {
    let (store, session) = setup();
    let config = config();
    let ctx = Ctx {
        store: &store,
        session: &session,
        config: &config,
    };
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.json");
    let out_str = out.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "oikonomos",
        "export",
        "transactions",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&ctx, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let data = std::fs::read_to_string(&out).unwrap();
    let v: serde_json::Value = serde_json::from_str(&data).unwrap();
    let rows = v.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["date"], json!("2025-01-01"));
    assert_eq!(rows[0]["type"], json!("income"));
    assert_eq!(rows[1]["amount"], json!("42.50"));
    assert_eq!(rows[1]["account"], json!("Wallet"));
    assert_eq!(rows[1]["description"], json!("Dinner"));
    assert_eq!(rows[2]["category"], json!("transport"));
}

#[test]
fn export_csv() {
    let (store, session) = setup();
    let config = config();
    let ctx = Ctx {
        store: &store,
        session: &session,
        config: &config,
    };
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    let out_str = out.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "oikonomos",
        "export",
        "transactions",
        "--format",
        "csv",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&ctx, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let data = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines[0], "date,type,amount,category,account,description");
    assert_eq!(lines[1], "2025-01-01,income,1500.00,salary,Wallet,");
    assert_eq!(lines[2], "2025-01-03,expense,42.50,food,Wallet,Dinner");
    assert_eq!(lines.len(), 4);
}

#[test]
fn unknown_format_is_rejected_by_the_parser() {
    let cli = cli::build_cli();
    let res = cli.try_get_matches_from([
        "oikonomos",
        "export",
        "transactions",
        "--format",
        "xml",
        "--out",
        "x.xml",
    ]);
    assert!(res.is_err());
}

#[test]
fn list_respects_limit_newest_first() {
    let (store, session) = setup();
    let config = config();
    let ctx = Ctx {
        store: &store,
        session: &session,
        config: &config,
    };
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["oikonomos", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", sub)) = tx_m.subcommand() {
            let rows = tx_cmd::query_rows(&ctx, sub).unwrap();
            let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
            assert_eq!(dates, vec!["2025-01-07", "2025-01-03"]);
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_category_filter_ignores_case() {
    let (store, session) = setup();
    let config = config();
    let ctx = Ctx {
        store: &store,
        session: &session,
        config: &config,
    };
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["oikonomos", "tx", "list", "--category", " Food "]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", sub)) = tx_m.subcommand() {
            let rows = tx_cmd::query_rows(&ctx, sub).unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].category, "food");
            assert_eq!(rows[0].amount, "42.50");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}
