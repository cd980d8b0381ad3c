use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// ISO 4217 style currency code (three uppercase ASCII letters).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Parse a currency code. Lowercase input is accepted and normalized.
    pub fn new(code: impl AsRef<str>) -> Result<Self, TypeError> {
        let code = code.as_ref().trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(TypeError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// Number of fractional digits a price in this currency may carry.
    pub fn minor_units(&self) -> u32 {
        match self.0.as_str() {
            "JPY" | "KRW" | "VND" | "CLP" | "ISK" | "UGX" | "XAF" | "XOF" => 0,
            "BHD" | "KWD" | "OMR" | "JOD" | "TND" | "IQD" | "LYD" => 3,
            _ => 2,
        }
    }
}

impl TryFrom<String> for Currency {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl FromStr for Currency {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, strictly positive price in a specific currency.
///
/// Construction normalizes trailing zeros and rejects amounts with more
/// fractional digits than the currency allows, so `Money` never carries
/// sub-minor-unit precision. Amounts too close to `Decimal::MAX` to be
/// written at the currency's scale are rejected as well.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr")]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

#[derive(Deserialize)]
struct MoneyRepr {
    amount: Decimal,
    currency: Currency,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = TypeError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        Self::new(repr.amount, repr.currency)
    }
}

impl Money {
    pub fn new(amount: Decimal, currency: Currency) -> Result<Self, TypeError> {
        if amount <= Decimal::ZERO {
            return Err(TypeError::NonPositivePrice(amount.to_string()));
        }
        let normalized = amount.normalize();
        let allowed = currency.minor_units();
        if normalized.scale() > allowed {
            return Err(TypeError::ExcessPrecision {
                amount: amount.to_string(),
                currency: currency.code().to_string(),
                scale: normalized.scale(),
                allowed,
            });
        }
        let mut fixed = normalized;
        fixed.rescale(allowed);
        if fixed.scale() != allowed {
            return Err(TypeError::AmountOutOfRange {
                amount: amount.to_string(),
                allowed,
            });
        }
        Ok(Self {
            amount: normalized,
            currency,
        })
    }

    /// Parse a decimal string such as `"120.50"`. `NaN`, infinities and
    /// exponent notation are not decimals and fail to parse.
    pub fn parse(amount: &str, currency: Currency) -> Result<Self, TypeError> {
        let trimmed = amount.trim();
        let value =
            Decimal::from_str(trimmed).map_err(|_| TypeError::InvalidDecimal(trimmed.to_string()))?;
        Self::new(value, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Fixed-scale text at the currency's minor units, e.g. `"120.00"`.
    pub fn canonical_amount(&self) -> String {
        let mut scaled = self.amount;
        scaled.rescale(self.currency.minor_units());
        scaled.to_string()
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({} {})", self.canonical_amount(), self.currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.canonical_amount(), self.currency)
    }
}
