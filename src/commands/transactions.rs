// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::{accounts, quick_add, transactions};
use crate::ledger::transactions::{NewTransaction, TransactionEdit, TransactionFilter, TransferRequest};
use crate::models::{Transaction, TxKind};
use crate::money::fmt_plain;
use crate::utils::{
    json_flags, maybe_print_json, optional, parse_day, parse_decimal, pretty_table, required,
};
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::collections::HashMap;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ctx, sub)?,
        Some(("quick", sub)) => quick(ctx, sub)?,
        Some(("transfer", sub)) => transfer(ctx, sub)?,
        Some(("edit", sub)) => edit(ctx, sub)?,
        Some(("rm", sub)) => remove(ctx, sub)?,
        Some(("list", sub)) => list(ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TxKind = required(sub, "type")?.parse().map_err(|e: String| anyhow!(e))?;
    let account = accounts::resolve(ctx.store, ctx.session, required(sub, "account")?)?;
    let tx = transactions::create(
        ctx.store,
        ctx.session,
        NewTransaction {
            kind,
            amount: parse_decimal(required(sub, "amount")?)?,
            category: required(sub, "category")?.trim().to_lowercase(),
            account_id: account.id.clone(),
            description: optional(sub, "description").map(str::to_string),
            date: optional(sub, "date").map(parse_day).transpose()?,
        },
    )?;
    println!(
        "Recorded {} {} in '{}' on {} (acct: {})",
        tx.kind,
        ctx.money(tx.amount),
        tx.category,
        tx.created_at.date_naive(),
        account.account_name
    );
    Ok(())
}

fn quick(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let text = sub
        .get_many::<String>("text")
        .map(|parts| parts.map(String::as_str).collect::<Vec<_>>().join(" "))
        .unwrap_or_default();
    let tx = quick_add::record(ctx.store, ctx.session, &text)?;
    println!(
        "Expense of {} in '{}' recorded{}",
        ctx.money(tx.amount),
        tx.category,
        if tx.account_id.is_none() { " (no default account)" } else { "" }
    );
    Ok(())
}

fn transfer(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let from = accounts::resolve(ctx.store, ctx.session, required(sub, "from")?)?;
    let to = accounts::resolve(ctx.store, ctx.session, required(sub, "to")?)?;
    let done = transactions::transfer(
        ctx.store,
        ctx.session,
        TransferRequest {
            from: from.id.clone(),
            to: to.id.clone(),
            amount: parse_decimal(required(sub, "amount")?)?,
            description: optional(sub, "description").map(str::to_string),
            date: optional(sub, "date").map(parse_day).transpose()?,
        },
    )?;
    println!(
        "Transferred {} from '{}' to '{}'",
        ctx.money(done.debit.amount),
        from.account_name,
        to.account_name
    );
    Ok(())
}

fn edit(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let changes = TransactionEdit {
        amount: optional(sub, "amount").map(parse_decimal).transpose()?,
        category: optional(sub, "category").map(|c| c.trim().to_lowercase()),
        description: optional(sub, "description").map(str::to_string),
        date: optional(sub, "date").map(parse_day).transpose()?,
    };
    let tx = transactions::edit(ctx.store, ctx.session, id, changes)?;
    println!("Updated transaction {} ({} {})", tx.id, tx.kind, ctx.money(tx.amount));
    Ok(())
}

fn remove(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let ids: Vec<String> = sub
        .get_many::<String>("ids")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    let removed = transactions::delete_many(ctx.store, ctx.session, &ids)?;
    println!("Removed {} transaction(s)", removed.len());
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub account: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: String,
    pub category: String,
    pub description: String,
}

pub fn filter_from(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let account_id = match optional(sub, "account") {
        Some(key) => Some(accounts::resolve(ctx.store, ctx.session, key)?.id),
        None => None,
    };
    let kind = optional(sub, "type")
        .map(|s| s.parse::<TxKind>().map_err(|e| anyhow!(e)))
        .transpose()?;
    let to = match optional(sub, "to") {
        // inclusive day: stop before the next midnight
        Some(s) => Some(parse_day(s)? + chrono::Duration::days(1)),
        None => None,
    };
    Ok(TransactionFilter {
        account_id,
        category: optional(sub, "category").map(|c| c.trim().to_lowercase()),
        kind,
        from: optional(sub, "from").map(parse_day).transpose()?,
        to,
        limit: sub.get_one::<usize>("limit").copied(),
    })
}

pub fn query_rows(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = filter_from(ctx, sub)?;
    let txs = transactions::list(ctx.store, ctx.session, &filter)?;
    let names: HashMap<String, String> = accounts::list(ctx.store, ctx.session, &Default::default())?
        .into_iter()
        .map(|a| (a.id, a.account_name))
        .collect();
    Ok(txs.iter().map(|t| row_for(t, &names)).collect())
}

pub fn row_for(t: &Transaction, names: &HashMap<String, String>) -> TransactionRow {
    TransactionRow {
        id: t.id.clone(),
        date: t.created_at.date_naive().to_string(),
        account: t
            .account_id
            .as_ref()
            .and_then(|id| names.get(id).cloned())
            .unwrap_or_default(),
        kind: t.kind.to_string(),
        amount: fmt_plain(t.amount),
        category: t.category.clone(),
        description: t.description.clone().unwrap_or_default(),
    }
}

fn list(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let data = query_rows(ctx, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.account.clone(),
                    r.kind.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Account", "Type", "Amount", "Category", "Description", "Id"],
                rows,
            )
        );
    }
    Ok(())
}
