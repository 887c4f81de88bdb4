//! Display-only projections: expected payout and a flat market snapshot.
//!
//! `potential_profit` multiplies the complement of the current price by
//! the paid-in amount, treating currency paid as if it were shares held.
//! It is a user-facing estimate, never an accounting figure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::market::{ReserveState, Side};

/// Flat read-only view of a market for display and persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub price_yes: Decimal,
    pub price_no: Decimal,
    /// YES price as a percentage.
    pub implied_probability: Decimal,
    pub yes_reserve: Decimal,
    pub no_reserve: Decimal,
    pub constant_product: Decimal,
}

impl ReserveState {
    /// `(1 - price(side)) * amount`. Does not mutate the market.
    ///
    /// Prices stay in `[0, 1]`, so the factor never exceeds one and the
    /// result is always representable.
    pub fn potential_profit(&self, side: Side, amount: Decimal) -> Decimal {
        (Decimal::ONE - self.price(side)) * amount
    }

    /// Current prices, probability and raw reserves in one record.
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            price_yes: self.price(Side::Yes),
            price_no: self.price(Side::No),
            implied_probability: self.implied_probability(),
            yes_reserve: self.yes_reserve,
            no_reserve: self.no_reserve,
            constant_product: self.constant_product,
        }
    }
}
