use thiserror::Error;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("{kind} must not be empty")]
    EmptyIdentifier { kind: &'static str },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid currency code '{0}': expected three uppercase ASCII letters")]
    InvalidCurrency(String),

    #[error("invalid decimal '{0}'")]
    InvalidDecimal(String),

    #[error("price must be greater than zero, got {0}")]
    NonPositivePrice(String),

    #[error("price {amount} has {scale} fractional digits but {currency} allows {allowed}")]
    ExcessPrecision {
        amount: String,
        currency: String,
        scale: u32,
        allowed: u32,
    },

    #[error("price {amount} is too large to carry {allowed} fractional digits")]
    AmountOutOfRange { amount: String, allowed: u32 },
}
