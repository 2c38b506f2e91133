//! Money value object.
//!
//! Amounts are held in the currency's minor unit (kopecks for RUB, whole
//! stars for XTR) so arithmetic never touches floating point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Currencies accepted by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rub,
    Usd,
    Eur,
    /// Telegram Stars.
    Xtr,
}

impl Currency {
    /// Number of decimal places in the minor unit.
    pub fn exponent(&self) -> u32 {
        match self {
            Currency::Xtr => 0,
            _ => 2,
        }
    }

    /// ISO-style code as used by payment providers.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Xtr => "XTR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUB" => Ok(Currency::Rub),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "XTR" => Ok(Currency::Xtr),
            other => Err(ValidationError::invalid_format(
                "currency",
                format!("unsupported currency '{}'", other),
            )),
        }
    }
}

/// An amount of money in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units.
    pub minor: i64,
    pub currency: Currency,
}

impl Money {
    /// Creates an amount from minor units, rejecting negatives.
    pub fn from_minor(minor: i64, currency: Currency) -> Result<Self, ValidationError> {
        if minor < 0 {
            return Err(ValidationError::out_of_range("price", 0, i64::MAX, minor));
        }
        Ok(Self { minor, currency })
    }

    /// Zero in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Parses a decimal string such as `"500"` or `"499.90"`.
    pub fn parse_decimal(input: &str, currency: Currency) -> Result<Self, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::zero(currency));
        }
        if input.starts_with('-') {
            return Err(ValidationError::invalid_format("price", "must not be negative"));
        }

        let exponent = currency.exponent() as usize;
        let (whole, frac) = match input.split_once('.') {
            Some((w, f)) => (w, f),
            None => (input, ""),
        };
        if frac.len() > exponent {
            return Err(ValidationError::invalid_format(
                "price",
                format!("at most {} decimal places for {}", exponent, currency),
            ));
        }
        let digits_ok = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !digits_ok(whole) || !digits_ok(frac) {
            return Err(ValidationError::invalid_format("price", "not a decimal number"));
        }

        let scale = 10_i64.pow(exponent as u32);
        let whole: i64 = whole
            .parse()
            .map_err(|_| ValidationError::invalid_format("price", "amount too large"))?;
        let frac_padded = format!("{:0<width$}", frac, width = exponent);
        let frac: i64 = if frac_padded.is_empty() {
            0
        } else {
            frac_padded
                .parse()
                .map_err(|_| ValidationError::invalid_format("price", "not a decimal number"))?
        };

        let minor = whole
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(|| ValidationError::invalid_format("price", "amount too large"))?;
        Ok(Self { minor, currency })
    }

    /// Returns true when the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Whole major units, truncated.
    pub fn major_units(&self) -> i64 {
        self.minor / 10_i64.pow(self.currency.exponent())
    }

    /// Formats the amount with exactly `exponent` decimals, e.g. `"500.00"`.
    pub fn to_decimal_string(&self) -> String {
        let exponent = self.currency.exponent();
        if exponent == 0 {
            return self.minor.to_string();
        }
        let scale = 10_i64.pow(exponent);
        format!(
            "{}.{:0width$}",
            self.minor / scale,
            self.minor % scale,
            width = exponent as usize
        )
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal_string(), self.currency)
    }
}
