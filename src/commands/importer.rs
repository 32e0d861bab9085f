// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::import::{self, ImportReport};
use crate::utils::{pretty_table, required};
use anyhow::{Context, Result};
use std::fs::File;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let report = import_transactions(ctx, sub)?;
            print_report(&report);
            Ok(())
        }
        _ => Ok(()),
    }
}

pub fn import_transactions(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<ImportReport> {
    let path = required(sub, "path")?.trim();
    let file = File::open(path).with_context(|| format!("Open CSV {}", path))?;
    let report = import::import_csv(ctx.store, ctx.session, file)
        .with_context(|| format!("Import {}", path))?;
    Ok(report)
}

fn print_report(report: &ImportReport) {
    println!("Imported {} transaction(s)", report.imported.len());
    if !report.errors.is_empty() {
        let rows = report
            .errors
            .iter()
            .map(|e| vec![e.line.to_string(), e.message.clone()])
            .collect();
        println!("{}", pretty_table(&["Line", "Problem"], rows));
    }
}
