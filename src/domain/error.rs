//! Engine errors.
//!
//! Only malformed input and arithmetic failure are errors. A guard
//! rejection is a legitimate business outcome and is reported through
//! `TradeStatus::Rejected` instead (see `executor`).

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the market engine before any reserve mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Side argument outside `{yes, no}`.
    #[error("invalid side '{0}': expected 'yes' or 'no'")]
    InvalidSide(String),

    /// Trade amount must be strictly positive.
    #[error("trade amount must be positive, got {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: Decimal,
    },

    /// Reserves and the recorded product can never be negative.
    #[error("{field} must be non-negative, got {value}")]
    NegativeReserve {
        /// Which field carried the negative value.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// Decimal arithmetic exceeded the representable range.
    #[error("decimal overflow while computing {0}")]
    Overflow(&'static str),
}
