// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::{projector, reports, transactions};
use crate::models::Transaction;
use crate::utils::{json_flags, maybe_print_json, optional, parse_date, pretty_table};
use anyhow::Result;
use serde_json::json;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(ctx, sub)?,
        Some(("summary", sub)) => summary(ctx, sub)?,
        Some(("monthly", sub)) => monthly(ctx, sub)?,
        Some(("evolution", sub)) => evolution(ctx, sub)?,
        Some(("categories", sub)) => by_category(ctx, sub)?,
        Some(("ranking", sub)) => ranking(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

/// Transactions within the optional `--from`/`--to` days.
fn in_range(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let from = optional(sub, "from").map(parse_date).transpose()?;
    let to = optional(sub, "to").map(parse_date).transpose()?;
    let all = transactions::list(ctx.store, ctx.session, &Default::default())?;
    Ok(reports::filter_by_date(&all, from, to))
}

fn balances(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let accounts = projector::accounts_with_balances(ctx.store, ctx.session)?;
    let data: Vec<_> = accounts
        .iter()
        .map(|a| json!({"account": a.account_name, "balance": a.balance, "reserve": a.is_reserve}))
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = accounts
            .iter()
            .map(|a| vec![a.account_name.clone(), ctx.money(a.balance)])
            .collect();
        println!("{}", pretty_table(&["Account", "Balance"], rows));
    }
    Ok(())
}

fn summary(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let s = reports::summarize(&in_range(ctx, sub)?);
    if !maybe_print_json(json_flag, jsonl_flag, &s)? {
        println!(
            "{}",
            pretty_table(
                &["Income", "Expense", "Balance"],
                vec![vec![
                    ctx.money(s.total_income),
                    ctx.money(s.total_expense),
                    ctx.money(s.balance),
                ]],
            )
        );
    }
    Ok(())
}

fn monthly(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let flow = reports::monthly_flow(&in_range(ctx, sub)?);
    if !maybe_print_json(json_flag, jsonl_flag, &flow)? {
        let rows = flow
            .iter()
            .map(|f| vec![f.month.clone(), ctx.money(f.income), ctx.money(f.expense)])
            .collect();
        println!("{}", pretty_table(&["Month", "Income", "Expense"], rows));
    }
    Ok(())
}

fn evolution(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let points = reports::balance_evolution(&in_range(ctx, sub)?);
    if !maybe_print_json(json_flag, jsonl_flag, &points)? {
        let rows = points
            .iter()
            .map(|p| vec![p.date.to_string(), ctx.money(p.balance)])
            .collect();
        println!("{}", pretty_table(&["Date", "Balance"], rows));
    }
    Ok(())
}

fn by_category(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let totals = reports::expenses_by_category(&in_range(ctx, sub)?);
    let data: Vec<_> = totals
        .iter()
        .map(|(c, v)| json!({"category": c, "spent": v}))
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows = totals
            .iter()
            .map(|(c, v)| vec![c.clone(), ctx.money(*v)])
            .collect();
        println!("{}", pretty_table(&["Category", "Spent"], rows));
    }
    Ok(())
}

fn ranking(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let top = sub.get_one::<usize>("top").copied().unwrap_or(10);
    let ranked = reports::expense_ranking(&in_range(ctx, sub)?, top);
    if !maybe_print_json(json_flag, jsonl_flag, &ranked)? {
        let rows = ranked
            .iter()
            .enumerate()
            .map(|(i, t)| {
                vec![
                    (i + 1).to_string(),
                    t.created_at.date_naive().to_string(),
                    t.category.clone(),
                    t.description.clone().unwrap_or_default(),
                    ctx.money(t.amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["#", "Date", "Category", "Description", "Amount"], rows)
        );
    }
    Ok(())
}
