// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::commands::transactions::{row_for, TransactionRow};
use crate::ledger::{accounts, transactions};
use crate::utils::required;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(ctx, sub),
        _ => Ok(()),
    }
}

/// Oldest first, so a CSV export can be imported back in order.
pub fn export_rows(ctx: &Ctx) -> Result<Vec<TransactionRow>> {
    let mut txs = transactions::list(ctx.store, ctx.session, &Default::default())?;
    txs.reverse();
    let names: HashMap<String, String> = accounts::list(ctx.store, ctx.session, &Default::default())?
        .into_iter()
        .map(|a| (a.id, a.account_name))
        .collect();
    Ok(txs.iter().map(|t| row_for(t, &names)).collect())
}

fn export_transactions(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;
    let rows = export_rows(ctx)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(["date", "type", "amount", "category", "account", "description"])?;
            for r in &rows {
                wtr.write_record([
                    &r.date,
                    &r.kind,
                    &r.amount,
                    &r.category,
                    &r.account,
                    &r.description,
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)
                .with_context(|| format!("Write {}", out))?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
