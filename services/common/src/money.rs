//! Fixed-point money helpers
//!
//! Amounts cross the service edge as decimal strings and live inside the
//! aggregation store as `i64` minor units (1 minor unit = 0.01). Input is
//! rounded half-down to two places, averages are rounded half-up.

use crate::constants::fixed_point::{MAX_FRACTION_DIGITS, MAX_INTEGER_DIGITS, MONEY_DP, SCALE_2};
use crate::constants::limits::MAX_AMOUNT_LEN;
use crate::errors::ServiceError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a decimal amount string using the default length limit
pub fn parse_amount(raw: &str) -> Result<Decimal, ServiceError> {
    parse_amount_with_limit(raw, MAX_AMOUNT_LEN)
}

/// Parse a non-negative decimal amount, rounding half-down to 2 places
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// optional exponent (`1.5e2`). Digit separators and whitespace are rejected.
/// The result always fits in `i64` minor units.
pub fn parse_amount_with_limit(raw: &str, max_len: usize) -> Result<Decimal, ServiceError> {
    if raw.len() > max_len {
        return Err(ServiceError::AmountTooLong {
            len: raw.len(),
            max: max_len,
        });
    }
    if !is_decimal_literal(raw) {
        return Err(ServiceError::InvalidAmount(raw.to_string()));
    }

    let unsigned = raw.strip_prefix('+').unwrap_or(raw);
    let plain = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => expand_exponent(raw, mantissa, exponent)?,
        None => unsigned.to_string(),
    };

    // Well-formed but unrepresentable means too many integer digits
    let parsed = Decimal::from_str(&plain)
        .map_err(|_| ServiceError::AmountOverflow(raw.to_string()))?;

    if parsed.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if parsed.is_sign_negative() {
        return Err(ServiceError::NegativeAmount(raw.to_string()));
    }

    let rounded = parsed.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointTowardZero);
    to_minor_units(rounded).map_err(|_| ServiceError::AmountOverflow(raw.to_string()))?;
    Ok(rounded)
}

/// Rewrite `mantissa e exponent` as a plain literal (`1.5e2` -> `150`)
fn expand_exponent(raw: &str, mantissa: &str, exponent: &str) -> Result<String, ServiceError> {
    let exponent: i64 = exponent
        .parse()
        .map_err(|_| ServiceError::InvalidAmount(raw.to_string()))?;

    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{int_part}{frac_part}");
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok("0".to_string());
    }

    // Decimal point position relative to the first significant digit
    let int_len = i64::try_from(int_part.len()).unwrap_or(i64::MAX);
    let leading = i64::try_from(digits.len() - significant.len()).unwrap_or(i64::MAX);
    let point = int_len.saturating_sub(leading).saturating_add(exponent);

    if point > MAX_INTEGER_DIGITS {
        return Err(ServiceError::AmountOverflow(raw.to_string()));
    }
    if point < -MAX_FRACTION_DIGITS {
        // Below the finest representable scale; parses to zero in plain form too
        return Ok("0".to_string());
    }

    let shift = usize::try_from(point.unsigned_abs()).unwrap_or_default();
    let expanded = if point <= 0 {
        format!("{sign}0.{}{significant}", "0".repeat(shift))
    } else if shift >= significant.len() {
        format!("{sign}{significant}{}", "0".repeat(shift - significant.len()))
    } else {
        let (whole, fraction) = significant.split_at(shift);
        format!("{sign}{whole}.{fraction}")
    };
    Ok(expanded)
}

/// Convert a non-negative amount to minor units, truncating extra precision
pub fn to_minor_units(amount: Decimal) -> Result<i64, ServiceError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ServiceError::NegativeAmount(amount.to_string()));
    }
    amount
        .checked_mul(Decimal::from(SCALE_2))
        .and_then(|scaled| scaled.trunc().to_i64())
        .ok_or_else(|| ServiceError::AmountOverflow(amount.to_string()))
}

/// Convert minor units back to a decimal amount
#[must_use]
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, MONEY_DP)
}

/// Average amount per order, half-up to 2 places; zero when there are no orders
#[must_use]
pub fn average(total: Decimal, orders: u64) -> Decimal {
    if orders == 0 {
        return Decimal::ZERO;
    }
    total
        .checked_div(Decimal::from(orders))
        .map_or(Decimal::ZERO, |avg| {
            avg.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
        })
}

/// Render an amount with exactly 2 fractional digits ("15.01", "0.00")
#[must_use]
pub fn format_fixed_2(amount: Decimal) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded.to_string()
}

/// `[+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?`
fn is_decimal_literal(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    let mut mantissa_digits = pos - int_start;

    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        let frac_start = pos;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        mantissa_digits += pos - frac_start;
    }
    if mantissa_digits == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exp_start = pos;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        if pos == exp_start {
            return false;
        }
    }

    pos == bytes.len()
}
