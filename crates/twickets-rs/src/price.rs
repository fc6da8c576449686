//! Fixed-point prices.
//!
//! Amounts are held in minor units (pence, cents) so sums and per-ticket splits
//! never drift. [`Price::number`] is the only lossy conversion and is meant for
//! display and ratio maths, never for further monetary arithmetic.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Currency of a [`Price`]. Listings without a currency code are treated as GBP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Gbp => "£",
            Currency::Eur => "€",
            Currency::Usd => "$",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    CurrencyMismatch { left: Currency, right: Currency },
    /// Division by zero tickets.
    InvalidDivisor(u32),
    /// Result does not fit in an `i64` amount.
    Overflow,
}

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceError::CurrencyMismatch { left, right } => {
                write!(f, "cannot combine {} and {} prices", left, right)
            }
            PriceError::InvalidDivisor(n) => write!(f, "cannot divide price by {}", n),
            PriceError::Overflow => write!(f, "price amount out of range"),
        }
    }
}

impl std::error::Error for PriceError {}

/// A monetary amount in minor units of a single currency.
///
/// Wire shape: `{"currencyCode": "GBP", "amountInCents": 1234}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Price {
    #[serde(rename = "currencyCode", default)]
    pub currency: Currency,
    /// Amount in minor units, e.g. pence.
    #[serde(rename = "amountInCents", default)]
    pub amount: i64,
}

impl Price {
    pub fn new(currency: Currency, amount: i64) -> Self {
        Self { currency, amount }
    }

    pub fn gbp(pence: i64) -> Self {
        Self::new(Currency::Gbp, pence)
    }

    /// Sum of two prices in the same currency.
    pub fn add(self, other: Price) -> Result<Price, PriceError> {
        self.same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(PriceError::Overflow)?;
        Ok(Price::new(self.currency, amount))
    }

    /// Splits the price into `n` equal parts.
    ///
    /// Exact when the amount is a multiple of `n`. Otherwise the remainder is
    /// dropped (integer division truncating toward zero), so
    /// `p.divide(n)?.multiply(n)?` can be up to `n - 1` minor units below `p`.
    pub fn divide(self, n: u32) -> Result<Price, PriceError> {
        if n == 0 {
            return Err(PriceError::InvalidDivisor(n));
        }
        Ok(Price::new(self.currency, self.amount / i64::from(n)))
    }

    pub fn multiply(self, n: u32) -> Result<Price, PriceError> {
        let amount = self
            .amount
            .checked_mul(i64::from(n))
            .ok_or(PriceError::Overflow)?;
        Ok(Price::new(self.currency, amount))
    }

    /// Amount in major units. Lossy.
    pub fn number(self) -> f64 {
        self.amount as f64 / 100.0
    }

    pub fn is_zero(self) -> bool {
        self.amount == 0
    }

    /// Orders two prices of the same currency.
    pub fn compare(self, other: Price) -> Result<Ordering, PriceError> {
        self.same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    fn same_currency(self, other: Price) -> Result<(), PriceError> {
        if self.currency != other.currency {
            return Err(PriceError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        write!(f, "{}{}{}.{:02}", sign, self.currency.symbol(), abs / 100, abs % 100)
    }
}
