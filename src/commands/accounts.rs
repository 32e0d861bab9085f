// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::Ctx;
use crate::ledger::accounts::{self, AccountEdit, AccountFilter, AccountKind};
use crate::ledger::projector;
use crate::models::Account;
use crate::money::fmt_plain;
use crate::utils::{json_flags, maybe_print_json, optional, pretty_table, required};
use anyhow::{Context, Result};
use serde::Serialize;

pub fn handle(ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?;
            let account = accounts::create(ctx.store, ctx.session, name, sub.get_flag("reserve"))?;
            println!("Added account '{}' ({})", account.account_name, account.id);
        }
        Some(("list", sub)) => list(ctx, sub)?,
        Some(("edit", sub)) => {
            let account = accounts::resolve(ctx.store, ctx.session, required(sub, "account")?)?;
            let changes = AccountEdit {
                account_name: optional(sub, "name").map(str::to_string),
                is_reserve: sub.get_one::<bool>("reserve").copied(),
            };
            let updated = accounts::edit(ctx.store, ctx.session, &account.id, changes)?;
            println!(
                "Updated account '{}'{}",
                updated.account_name,
                if updated.is_reserve { " (reserve)" } else { "" }
            );
        }
        Some(("default", sub)) => {
            let account = accounts::resolve(ctx.store, ctx.session, required(sub, "account")?)?;
            accounts::set_default(ctx.store, ctx.session, &account.id)?;
            println!("'{}' is now the default account", account.account_name);
        }
        Some(("rm", sub)) => {
            let key = required(sub, "account")?;
            let account = accounts::resolve(ctx.store, ctx.session, key)?;
            accounts::delete(ctx.store, ctx.session, &account.id)
                .with_context(|| format!("Remove account '{}'", key))?;
            println!("Removed account '{}'", account.account_name);
        }
        _ => {}
    }
    Ok(())
}

#[derive(Serialize)]
pub struct AccountRow {
    pub id: String,
    pub name: String,
    pub balance: String,
    pub reserve: bool,
    pub default: bool,
}

impl From<&Account> for AccountRow {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id.clone(),
            name: a.account_name.clone(),
            balance: fmt_plain(a.balance),
            reserve: a.is_reserve,
            default: a.is_default,
        }
    }
}

pub fn filter_from(sub: &clap::ArgMatches) -> AccountFilter {
    let kind = match optional(sub, "kind") {
        Some("standard") => AccountKind::Standard,
        Some("reserve") => AccountKind::Reserve,
        _ => AccountKind::All,
    };
    AccountFilter {
        kind,
        search: optional(sub, "search").map(str::to_string),
    }
}

fn list(ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (json_flag, jsonl_flag) = json_flags(sub);
    let listed = accounts::list(ctx.store, ctx.session, &filter_from(sub))?;
    let data: Vec<AccountRow> = listed.iter().map(AccountRow::from).collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let total = projector::total(listed.iter().map(|a| &a.balance));
        let mut rows: Vec<Vec<String>> = listed
            .iter()
            .map(|a| {
                let mut flags = Vec::new();
                if a.is_reserve {
                    flags.push("reserve");
                }
                if a.is_default {
                    flags.push("default");
                }
                vec![
                    a.account_name.clone(),
                    ctx.money(a.balance),
                    flags.join(", "),
                    a.id.clone(),
                ]
            })
            .collect();
        rows.push(vec!["Total".into(), ctx.money(total), String::new(), String::new()]);
        println!("{}", pretty_table(&["Account", "Balance", "Flags", "Id"], rows));
    }
    Ok(())
}
