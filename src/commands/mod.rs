// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod bills;
pub mod budgets;
pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod forecast;
pub mod goals;
pub mod importer;
pub mod reports;
pub mod transactions;

use rust_decimal::Decimal;

use crate::config::Config;
use crate::money::fmt_currency;
use crate::session::Session;
use crate::store::LedgerStore;

/// What every command handler works against.
pub struct Ctx<'a> {
    pub store: &'a dyn LedgerStore,
    pub session: &'a Session,
    pub config: &'a Config,
}

impl Ctx<'_> {
    pub fn money(&self, amount: Decimal) -> String {
        fmt_currency(amount, &self.config.currency_symbol)
    }
}
