// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::accounts;
use crate::ledger::goals::{self, Destination, GoalEdit, NewGoal};
use crate::money::fmt_plain;
use crate::utils::{
    json_flags, maybe_print_json, optional, parse_date, parse_decimal, pretty_table, required,
};
use anyhow::{bail, Result};
use rust_decimal::Decimal;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let goal = goals::create(
                ctx.store,
                ctx.session,
                NewGoal {
                    goal_name: required(sub, "name")?.to_string(),
                    target_amount: parse_decimal(required(sub, "target")?)?,
                    target_date: optional(sub, "date").map(parse_date).transpose()?,
                },
            )?;
            println!("Added goal '{}' targeting {}", goal.goal_name, ctx.money(goal.target_amount));
        }
        Some(("edit", sub)) => {
            let goal = goals::resolve(ctx.store, ctx.session, required(sub, "goal")?)?;
            let changes = GoalEdit {
                goal_name: optional(sub, "name").map(str::to_string),
                target_amount: optional(sub, "target").map(parse_decimal).transpose()?,
                target_date: optional(sub, "date").map(parse_date).transpose()?,
            };
            let updated = goals::edit(ctx.store, ctx.session, &goal.id, changes)?;
            println!("Updated goal '{}'", updated.goal_name);
        }
        Some(("rm", sub)) => {
            let goal = goals::resolve(ctx.store, ctx.session, required(sub, "goal")?)?;
            goals::delete(ctx.store, ctx.session, &goal.id)?;
            println!("Removed goal '{}'", goal.goal_name);
        }
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("contribute", sub)) => {
            let goal = goals::resolve(ctx.store, ctx.session, required(sub, "goal")?)?;
            let account = accounts::resolve(ctx.store, ctx.session, required(sub, "account")?)?;
            let amount = parse_decimal(required(sub, "amount")?)?;
            let done = goals::contribute(ctx.store, ctx.session, &goal.id, amount, &account.id)?;
            println!(
                "Moved {} from '{}' into '{}' ({}% of target)",
                ctx.money(amount),
                account.account_name,
                done.goal.goal_name,
                fmt_plain(done.goal.progress().min(Decimal::ONE_HUNDRED))
            );
        }
        Some(("complete", sub)) => {
            let goal = goals::resolve(ctx.store, ctx.session, required(sub, "goal")?)?;
            let destination = match optional(sub, "account") {
                Some(key) => {
                    Destination::Existing(accounts::resolve(ctx.store, ctx.session, key)?.id)
                }
                None if sub.get_flag("new-account") => Destination::NewAccount {
                    reserve: sub.get_flag("reserve"),
                },
                None => bail!("Choose a destination: --account <name> or --new-account"),
            };
            let done = goals::complete(ctx.store, ctx.session, &goal.id, destination)?;
            println!(
                "Goal '{}' completed: {} released into {}'{}'",
                goal.goal_name,
                ctx.money(done.transaction.amount),
                if done.created_account { "new account " } else { "" },
                done.account.account_name
            );
        }
        _ => {}
    }
    Ok(())
}

fn list(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let listed = goals::list(ctx.store, ctx.session)?;
    if !maybe_print_json(json_flag, jsonl_flag, &listed)? {
        let data = listed
            .iter()
            .map(|g| {
                vec![
                    g.goal_name.clone(),
                    ctx.money(g.saved_amount),
                    ctx.money(g.target_amount),
                    format!("{}%", fmt_plain(g.progress().min(Decimal::ONE_HUNDRED))),
                    g.target_date.map(|d| d.to_string()).unwrap_or_default(),
                    g.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Goal", "Saved", "Target", "Progress", "By", "Id"], data)
        );
    }
    Ok(())
}
