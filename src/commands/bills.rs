// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::bills::{self, BillEdit, NewBill};
use crate::ledger::accounts;
use crate::utils::{
    json_flags, maybe_print_json, optional, parse_date, parse_decimal, parse_month, pretty_table,
    required,
};
use anyhow::Result;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let bill = bills::create(
                ctx.store,
                ctx.session,
                NewBill {
                    description: required(sub, "description")?.to_string(),
                    amount: parse_decimal(required(sub, "amount")?)?,
                    category_name: required(sub, "category")?.trim().to_lowercase(),
                    due_date: parse_date(required(sub, "due")?)?,
                    is_recurring: sub.get_flag("recurring"),
                },
            )?;
            println!(
                "Scheduled '{}' {} due {} ({})",
                bill.description,
                ctx.money(bill.amount),
                bill.due_date,
                bill.id
            );
        }
        Some(("edit", sub)) => {
            let changes = BillEdit {
                description: optional(sub, "description").map(str::to_string),
                amount: optional(sub, "amount").map(parse_decimal).transpose()?,
                category_name: optional(sub, "category").map(|c| c.trim().to_lowercase()),
                due_date: optional(sub, "due").map(parse_date).transpose()?,
            };
            let bill = bills::edit(ctx.store, ctx.session, required(sub, "id")?, changes)?;
            println!("Updated bill '{}'", bill.description);
        }
        Some(("rm", sub)) => {
            let id = required(sub, "id")?;
            bills::delete(ctx.store, ctx.session, id)?;
            println!("Removed bill {}", id);
        }
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("pay", sub)) => {
            let account = accounts::resolve(ctx.store, ctx.session, required(sub, "account")?)?;
            let done = bills::settle(ctx.store, ctx.session, required(sub, "id")?, &account.id)?;
            println!(
                "Paid '{}' {} from '{}'",
                done.bill.description,
                ctx.money(done.bill.amount),
                account.account_name
            );
            if let Some(next) = done.next {
                println!("Next installment due {} ({})", next.due_date, next.id);
            }
        }
        _ => {}
    }
    Ok(())
}

fn list(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let listed = match optional(sub, "month") {
        Some(s) => {
            let (year, month) = parse_month(s)?;
            bills::due_in_month(ctx.store, ctx.session, year, month)?
        }
        None => bills::pending(ctx.store, ctx.session)?,
    };
    if !maybe_print_json(json_flag, jsonl_flag, &listed)? {
        let data = listed
            .iter()
            .map(|b| {
                vec![
                    b.due_date.to_string(),
                    b.description.clone(),
                    ctx.money(b.amount),
                    b.category_name.clone(),
                    b.status.as_str().to_string(),
                    if b.is_recurring { "monthly".into() } else { String::new() },
                    b.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Due", "Description", "Amount", "Category", "Status", "Repeats", "Id"],
                data,
            )
        );
    }
    Ok(())
}
