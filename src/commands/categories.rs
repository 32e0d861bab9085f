// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::error::LedgerError;
use crate::ledger::categories;
use crate::models::{Category, TxKind};
use crate::utils::{json_flags, maybe_print_json, optional, pretty_table, required};
use anyhow::{anyhow, Result};

fn kind_arg(sub: &clap::ArgMatches, name: &str) -> Result<Option<TxKind>> {
    optional(sub, name)
        .map(|s| s.parse::<TxKind>().map_err(|e| anyhow!(e)))
        .transpose()
}

fn lookup(ctx: &Ctx, name: &str) -> Result<Category> {
    categories::find(ctx.store, ctx.session, name)?
        .ok_or_else(|| LedgerError::not_found("category", name).into())
}

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let kind = kind_arg(sub, "type")?.ok_or_else(|| anyhow!("missing --type"))?;
            let cat = categories::create(ctx.store, ctx.session, required(sub, "name")?, kind)?;
            println!("Added category '{}' ({})", cat.name, cat.kind);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = json_flags(sub);
            let listed = categories::list(ctx.store, ctx.session, kind_arg(sub, "type")?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &listed)? {
                let rows = listed
                    .iter()
                    .map(|c| vec![c.name.clone(), c.kind.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Name", "Type"], rows));
            }
        }
        Some(("edit", sub)) => {
            let current = lookup(ctx, required(sub, "category")?)?;
            let updated = categories::edit(
                ctx.store,
                ctx.session,
                &current.id,
                optional(sub, "name"),
                kind_arg(sub, "type")?,
            )?;
            println!("Category '{}' is now '{}' ({})", current.name, updated.name, updated.kind);
        }
        Some(("rm", sub)) => {
            let current = lookup(ctx, required(sub, "category")?)?;
            categories::delete(ctx.store, ctx.session, &current.id)?;
            println!("Removed category '{}'", current.name);
        }
        _ => {}
    }
    Ok(())
}
