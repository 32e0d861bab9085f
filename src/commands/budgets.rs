// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::budgets;
use crate::money::fmt_plain;
use crate::utils::{
    current_month, json_flags, maybe_print_json, optional, parse_decimal, parse_month,
    pretty_table, required,
};
use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(ctx, sub)?,
        Some(("set-month", sub)) => set_month(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("progress", sub)) => progress(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_arg(sub: &clap::ArgMatches) -> Result<(i32, u32)> {
    match optional(sub, "month") {
        Some(s) => parse_month(s),
        None => Ok(current_month()),
    }
}

fn set(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(required(sub, "month")?)?;
    let cat = required(sub, "category")?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let b = budgets::save(ctx.store, ctx.session, cat, year, month, amount)?;
    println!(
        "Budget set for {}-{:02} / {} = {}",
        year,
        month,
        b.category_name,
        ctx.money(b.amount)
    );
    Ok(())
}

/// Parses repeated `CATEGORY=AMOUNT` entries.
pub fn parse_entries<'a>(entries: impl IntoIterator<Item = &'a str>) -> Result<BTreeMap<String, Decimal>> {
    let mut out = BTreeMap::new();
    for entry in entries {
        let (cat, amount) = entry
            .rsplit_once('=')
            .ok_or_else(|| anyhow!("Invalid entry '{}', expected CATEGORY=AMOUNT", entry))?;
        out.insert(cat.trim().to_string(), parse_decimal(amount)?);
    }
    Ok(out)
}

fn set_month(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = parse_month(required(sub, "month")?)?;
    let entries = parse_entries(
        sub.get_many::<String>("entry")
            .into_iter()
            .flatten()
            .map(String::as_str),
    )?;
    let saved = budgets::save_month(ctx.store, ctx.session, year, month, &entries)?;
    println!("Saved {} budgets for {}-{:02}", saved.len(), year, month);
    Ok(())
}

fn list(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let (year, month) = month_arg(sub)?;
    let listed = budgets::list(ctx.store, ctx.session, year, month)?;
    if !maybe_print_json(json_flag, jsonl_flag, &listed)? {
        let data = listed
            .iter()
            .map(|b| {
                vec![
                    format!("{}-{:02}", b.year, b.month),
                    b.category_name.clone(),
                    ctx.money(b.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Category", "Budget"], data));
    }
    Ok(())
}

fn progress(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let (year, month) = month_arg(sub)?;
    let items = budgets::progress(ctx.store, ctx.session, year, month)?;
    if !maybe_print_json(json_flag, jsonl_flag, &items)? {
        let data = items
            .iter()
            .map(|p| {
                vec![
                    p.category.clone(),
                    ctx.money(p.budget),
                    ctx.money(p.spent),
                    format!("{}%", fmt_plain(p.percent())),
                    if p.is_over() { "over".into() } else { String::new() },
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Budget", "Spent", "Used", ""], data)
        );
    }
    Ok(())
}
