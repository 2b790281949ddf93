//! Hourly rate parsing and price rounding.

use once_cell::sync::Lazy;
use regex::Regex;

pub use error::RateError;
use error::Result;

use super::TimeInterval;

/// Upper bound accepted by [`parse_rate`].
pub const MAX_HOURLY_RATE: f64 = 1000.0;

/// Decimal places kept in prices.
pub const PRICE_DECIMALS: i32 = 2;

// Either grouped thousands ("1,250") or a plain digit run, then up to two decimals.
static RATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3}(,\d{3})+|\d+)(\.\d{1,2})?$").expect("rate pattern is valid")
});

/// Parses a submitted hourly rate such as `"12.50"`, `"$8"` or `"1,000.00"`.
///
/// Runs once at submission time; the input is never corrected in place.
/// Zero and anything above [`MAX_HOURLY_RATE`] are out of range.
pub fn parse_rate(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let unprefixed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim_start();
    if !RATE_PATTERN.is_match(unprefixed) {
        return Err(RateError::Malformed(input.to_string()));
    }
    let rate: f64 = unprefixed
        .replace(',', "")
        .parse()
        .map_err(|_| RateError::Malformed(input.to_string()))?;
    if rate <= 0.0 || rate > MAX_HOURLY_RATE {
        return Err(RateError::OutOfRange(rate));
    }
    Ok(rate)
}

/// Rounds half away from zero at `decimals` places.
///
/// The small epsilon absorbs binary representation error so that values
/// written as exact halves (`1.005`) round up.
#[must_use]
pub fn round_half_up(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = (value.abs() * factor + 0.5 + 1e-9).floor();
    value.signum() * scaled / factor
}

/// `hours(interval) * hourly_rate`, rounded to cents.
#[must_use]
pub fn price_for(interval: &TimeInterval, hourly_rate: f64) -> f64 {
    round_half_up(interval.hours() * hourly_rate, PRICE_DECIMALS)
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum RateError {
        #[error("Malformed hourly rate {0:?}")]
        Malformed(String),
        #[error("Hourly rate {0} is outside (0, {max}]", max = super::MAX_HOURLY_RATE)]
        OutOfRange(f64),
    }
    pub type Result<T> = std::result::Result<T, RateError>;
}
