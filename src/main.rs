// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use oikonomos::commands::{self, Ctx};
use oikonomos::config::Config;
use oikonomos::session::Session;
use oikonomos::{cli, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let config = Config::resolve(&matches)?;
    let store = db::open_or_init(&config.db_path)?;
    let session = Session::new(config.user_id.clone());
    let ctx = Ctx {
        store: &store,
        session: &session,
        config: &config,
    };

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", config.db_path.display());
        }
        Some(("account", sub)) => commands::accounts::handle(&ctx, sub)?,
        Some(("category", sub)) => commands::categories::handle(&ctx, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&ctx, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&ctx, sub)?,
        Some(("bill", sub)) => commands::bills::handle(&ctx, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&ctx, sub)?,
        Some(("report", sub)) => commands::reports::handle(&ctx, sub)?,
        Some(("forecast", sub)) => commands::forecast::handle(&ctx, sub)?,
        Some(("import", sub)) => commands::importer::handle(&ctx, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&ctx, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&ctx, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
