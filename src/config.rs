// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;

use crate::db;

pub const ENV_DB: &str = "OIKONOMOS_DB";
pub const ENV_USER: &str = "OIKONOMOS_USER";
pub const ENV_CURRENCY: &str = "OIKONOMOS_CURRENCY";

pub const DEFAULT_USER: &str = "local";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "R$";

/// Runtime settings. Precedence: command-line flag, environment, default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub user_id: String,
    pub currency_symbol: String,
}

fn pick(flag: Option<&String>, var: &str) -> Option<String> {
    flag.cloned()
        .or_else(|| env::var(var).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn resolve(m: &ArgMatches) -> Result<Self> {
        let db_path = match pick(m.get_one::<String>("db"), ENV_DB) {
            Some(p) => PathBuf::from(p),
            None => db::default_db_path()?,
        };
        Ok(Self {
            db_path,
            user_id: pick(m.get_one::<String>("user"), ENV_USER)
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            currency_symbol: pick(m.get_one::<String>("currency-symbol"), ENV_CURRENCY)
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
        })
    }
}
