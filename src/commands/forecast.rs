// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::forecast::{self, ForecastInput};
use crate::models::{Forecast, ForecastLine, LineSource};
use crate::utils::{
    json_flags, maybe_print_json, optional, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::{anyhow, Context, Result};
use chrono::{Months, NaiveDate, Utc};
use std::collections::BTreeSet;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

/// Parses repeated `DESCRIPTION=AMOUNT` values into manual lines.
pub fn manual_lines<'a>(
    values: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<ForecastLine>> {
    values
        .into_iter()
        .map(|v| {
            let (desc, amount) = v
                .rsplit_once('=')
                .ok_or_else(|| anyhow!("Invalid line '{}', expected DESCRIPTION=AMOUNT", v))?;
            Ok(ForecastLine {
                description: desc.trim().to_string(),
                amount: parse_decimal(amount)?,
                source: LineSource::Manual,
            })
        })
        .collect()
}

fn many<'a>(sub: &'a clap::ArgMatches, name: &str) -> impl Iterator<Item = &'a str> {
    sub.get_many::<String>(name)
        .into_iter()
        .flatten()
        .map(String::as_str)
}

pub fn input_from(sub: &clap::ArgMatches) -> Result<ForecastInput> {
    let today = Utc::now().date_naive();
    let month = match optional(sub, "month") {
        Some(s) => {
            let (y, m) = parse_month(s)?;
            NaiveDate::from_ymd_opt(y, m, 1).context("forecast month")?
        }
        None => today
            .checked_add_months(Months::new(1))
            .context("next month out of range")?,
    };
    Ok(ForecastInput {
        month,
        as_of: optional(sub, "as-of").map(parse_date).transpose()?.unwrap_or(today),
        manual_incomes: manual_lines(many(sub, "income"))?,
        manual_expenses: manual_lines(many(sub, "expense"))?,
        excluded_bills: many(sub, "exclude").map(str::to_string).collect::<BTreeSet<_>>(),
    })
}

fn print_forecast(ctx: &Ctx, f: &Forecast) {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for l in &f.predicted_incomes {
        rows.push(vec!["income".into(), l.description.clone(), ctx.money(l.amount)]);
    }
    for l in &f.predicted_expenses {
        let kind = match l.source {
            LineSource::Fixed => "fixed",
            LineSource::Variable => "variable",
            LineSource::Manual => "manual",
        };
        rows.push(vec![kind.into(), l.description.clone(), ctx.money(l.amount)]);
    }
    println!(
        "Forecast for {}",
        f.forecast_month.format("%Y-%m")
    );
    println!("{}", pretty_table(&["Kind", "Description", "Amount"], rows));
    println!(
        "{}",
        pretty_table(
            &["Income", "Expense", "Balance"],
            vec![vec![
                ctx.money(f.total_income),
                ctx.money(f.total_expense),
                ctx.money(f.predicted_balance),
            ]],
        )
    );
}

fn show(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let input = input_from(sub)?;
    let mut projected = forecast::build(ctx.store, ctx.session, &input)?;
    if sub.get_flag("save") {
        projected = forecast::save(ctx.store, ctx.session, projected)?;
        eprintln!("Saved forecast {}", projected.id);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &projected)? {
        print_forecast(ctx, &projected);
    }
    Ok(())
}

fn list(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let saved = forecast::list(ctx.store, ctx.session)?;
    if !maybe_print_json(json_flag, jsonl_flag, &saved)? {
        let rows = saved
            .iter()
            .map(|f| {
                vec![
                    f.forecast_month.format("%Y-%m").to_string(),
                    ctx.money(f.total_income),
                    ctx.money(f.total_expense),
                    ctx.money(f.predicted_balance),
                    f.created_at.date_naive().to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Balance", "Saved"], rows)
        );
    }
    Ok(())
}
