// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{LedgerError, LedgerResult};

/// Parses a user supplied amount. Both `12.50` and `12,50` are accepted; when
/// a comma is present, dots are treated as thousands separators (`1.234,56`).
pub fn parse_amount(s: &str) -> LedgerResult<Decimal> {
    let trimmed = s.trim();
    let normalized = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };
    normalized
        .parse::<Decimal>()
        .map_err(|_| LedgerError::validation(format!("invalid amount '{}'", trimmed)))
}

/// Rejects zero and negative amounts.
pub fn ensure_positive(amount: Decimal, what: &str) -> LedgerResult<Decimal> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "{} must be greater than zero, got {}",
            what, amount
        )));
    }
    Ok(amount)
}

pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Two decimal places, `.` separator; used by tables and exports.
pub fn fmt_plain(amount: Decimal) -> String {
    format!("{:.2}", round_cents(amount))
}

/// Formats `amount` the way the dashboard shows money: `R$ 1.234,56`.
pub fn fmt_currency(amount: Decimal, symbol: &str) -> String {
    let rounded = round_cents(amount);
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{} {},{}", sign, symbol, grouped, frac_part)
}
