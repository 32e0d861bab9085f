// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::doctor;
use crate::utils::{json_flags, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(m);
    let fix = m.get_flag("fix");
    let drifts = if fix {
        doctor::fix(ctx.store, ctx.session)?
    } else {
        doctor::check(ctx.store, ctx.session)?
    };
    if maybe_print_json(json_flag, jsonl_flag, &drifts)? {
        return Ok(());
    }

    if drifts.is_empty() {
        println!("✅ doctor: stored balances match the transaction history");
        return Ok(());
    }
    let rows = drifts
        .iter()
        .map(|d| {
            vec![
                d.account_name.clone(),
                ctx.money(d.stored),
                ctx.money(d.projected),
                ctx.money(d.difference()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Account", "Stored", "From history", "Drift"], rows)
    );
    if fix {
        println!("Rewrote {} stored balance(s)", drifts.len());
    } else {
        println!("Run `oikonomos doctor --fix` to rewrite them");
    }
    Ok(())
}
