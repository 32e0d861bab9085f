// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::PathBuf;

use oikonomos::cli;
use oikonomos::commands::{importer, Ctx};
use oikonomos::config::Config;
use oikonomos::ledger::import;
use oikonomos::ledger::{accounts, categories, projector};
use oikonomos::models::TxKind;
use oikonomos::session::Session;
use oikonomos::store::{Collection, LedgerStore, SqliteStore};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (SqliteStore, Session, Config) {
    let store = SqliteStore::open_in_memory().unwrap();
    let session = Session::new("u1");
    categories::create(&store, &session, "Alimentação", TxKind::Expense).unwrap();
    categories::create(&store, &session, "salário", TxKind::Income).unwrap();
    accounts::create(&store, &session, "Carteira", false).unwrap();
    let config = Config {
        db_path: PathBuf::from(":memory:"),
        user_id: "u1".into(),
        currency_symbol: "R$".into(),
    };
    (store, session, config)
}

#[test]
fn normalize_strips_accents_and_case() {
    assert_eq!(import::normalize("  Alimentação "), "alimentacao");
    assert_eq!(import::normalize("DESCRIÇÃO"), "descricao");
    assert_eq!(import::normalize("plain"), "plain");
}

#[test]
fn import_valid_rows_and_report_bad_ones() {
    let (store, session, config) = setup();
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.csv");
    fs::write(
        &path,
        "Data,Tipo,Valor,Categoria,Conta,Descrição\n\
         2025-02-01,despesa,\"12,50\",Alimentacao,carteira,Almoço\n\
         not-a-date,despesa,10,alimentação,Carteira,\n\
         2025-02-02,expense,10,alimentação,Poupança,\n\
         2025-02-02,income,10,alimentação,Carteira,\n\
         2025-02-03,renda,1000,Salario,CARTEIRA,\n",
    )
    .unwrap();
    let path_str = path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["oikonomos", "import", "transactions", "--path", &path_str]);
    let ctx = Ctx {
        store: &store,
        session: &session,
        config: &config,
    };
    let report = if let Some(("import", import_m)) = matches.subcommand() {
        if let Some(("transactions", sub)) = import_m.subcommand() {
            importer::import_transactions(&ctx, sub).unwrap()
        } else {
            panic!("no transactions subcommand");
        }
    } else {
        panic!("no import subcommand");
    };

    assert_eq!(report.imported.len(), 2);
    let lines: Vec<u64> = report.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 4, 5]);

    let lunch = &report.imported[0];
    assert_eq!(lunch.amount, d("12.50"));
    assert_eq!(lunch.category, "alimentação");
    assert_eq!(lunch.description.as_deref(), Some("Almoço"));
    assert_eq!(report.imported[1].kind, TxKind::Income);

    let wallet = accounts::resolve(&store, &session, "carteira").unwrap();
    let doc = store.get(Collection::Accounts, &wallet.id).unwrap().unwrap();
    let stored: Decimal = doc.data["balance"].as_str().unwrap().parse().unwrap();
    assert_eq!(stored, d("987.50"));
    assert_eq!(
        projector::recomputed_balance(&store, &session, &wallet.id).unwrap(),
        d("987.50")
    );
}

#[test]
fn header_only_file_is_an_error_on_line_one() {
    let (store, session, _config) = setup();
    let report = import::import_csv(
        &store,
        &session,
        "date,type,amount,category,account,description\n".as_bytes(),
    )
    .unwrap();
    assert!(report.imported.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].line, 1);
}

#[test]
fn parse_csv_writes_nothing() {
    let (store, session, _config) = setup();
    let cats = categories::list(&store, &session, None).unwrap();
    let accts = accounts::list(&store, &session, &Default::default()).unwrap();
    let csv = "date,type,amount,category,account\n2025-01-01,expense,5,alimentacao,carteira\n";
    let report = import::parse_csv(csv.as_bytes(), "u1", &cats, &accts).unwrap();
    assert_eq!(report.imported.len(), 1);
    assert!(report.errors.is_empty());
    let txs = store
        .query(&session.scoped(Collection::Transactions))
        .unwrap();
    assert!(txs.is_empty());
}
