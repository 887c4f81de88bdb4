//! Trade executor: applies a buy order against the reserves.
//!
//! For a buy of `amount` on side S (own reserve R_s, other reserve R_o):
//!
//!   R_s' = R_s + amount
//!   R_o' = k / R_s'
//!   shares = R_o - R_o'
//!
//! If R_o' > R_o the trade is rejected (slippage guard) and nothing
//! changes. Otherwise both reserves are committed and k is recomputed
//! as R_yes' * R_no'. A trade either commits fully or not at all.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::market::{ReserveState, Side};

/// Reason code attached to every trade result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// The trade committed and `k` was recomputed. Shares may be zero
    /// (an empty opposite reserve, or an amount lost to rounding).
    Filled,
    /// The slippage guard refused the trade; reserves unchanged.
    Rejected,
    /// The side was neither yes nor no; nothing happened.
    InvalidSide,
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filled => write!(f, "filled"),
            Self::Rejected => write!(f, "rejected"),
            Self::InvalidSide => write!(f, "invalid_side"),
        }
    }
}

/// Result of a buy: the legacy `(shares, price)` pair plus a reason code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOutcome {
    /// Shares of the bought side received; zero unless filled.
    pub shares_received: Decimal,
    /// Post-trade price of the bought side, pre-trade on rejection,
    /// zero for an invalid side.
    pub price: Decimal,
    pub status: TradeStatus,
}

impl TradeOutcome {
    const fn filled(shares_received: Decimal, price: Decimal) -> Self {
        Self {
            shares_received,
            price,
            status: TradeStatus::Filled,
        }
    }

    const fn rejected(price: Decimal) -> Self {
        Self {
            shares_received: Decimal::ZERO,
            price,
            status: TradeStatus::Rejected,
        }
    }

    /// The `(0, 0)` no-op returned for an unrecognised side.
    pub const fn invalid_side() -> Self {
        Self {
            shares_received: Decimal::ZERO,
            price: Decimal::ZERO,
            status: TradeStatus::InvalidSide,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.status == TradeStatus::Filled
    }

    /// The bare `(shares_received, price)` pair older callers expect.
    pub const fn as_sentinel(&self) -> (Decimal, Decimal) {
        (self.shares_received, self.price)
    }
}

impl ReserveState {
    /// Buys `amount` worth of `side` against the reserves.
    ///
    /// # Errors
    /// `InvalidAmount` if `amount <= 0`, `Overflow` if the rebalanced
    /// reserves cannot be represented. Both leave the state untouched.
    /// A slippage-guard rejection is NOT an error: it returns
    /// `TradeStatus::Rejected` with zero shares.
    pub fn buy(&mut self, side: Side, amount: Decimal) -> Result<TradeOutcome, EngineError> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidAmount { amount });
        }

        let own = self.reserve(side);
        let other = self.reserve(side.opposite());

        let new_own = own
            .checked_add(amount)
            .ok_or(EngineError::Overflow("bought reserve"))?;
        let new_other = self
            .constant_product
            .checked_div(new_own)
            .ok_or(EngineError::Overflow("rebalanced reserve"))?;

        if new_other > other {
            return Ok(TradeOutcome::rejected(self.price(side)));
        }

        let shares_received = other - new_other;
        let (yes, no) = match side {
            Side::Yes => (new_own, new_other),
            Side::No => (new_other, new_own),
        };
        yes.checked_add(no)
            .ok_or(EngineError::Overflow("reserve sum"))?;
        let constant_product = yes
            .checked_mul(no)
            .ok_or(EngineError::Overflow("constant product"))?;

        self.yes_reserve = yes;
        self.no_reserve = no;
        self.constant_product = constant_product;

        Ok(TradeOutcome::filled(shares_received, self.price(side)))
    }

    /// Buy with a raw side string, as received from outer layers.
    ///
    /// An unrecognised side is a no-op returning the `(0, 0)` sentinel
    /// tagged `InvalidSide`. Callers that want a hard error should parse
    /// the side with `Side::from_str` and call `buy` directly.
    ///
    /// # Errors
    /// Same as `buy` once the side is recognised.
    pub fn buy_str(&mut self, side: &str, amount: Decimal) -> Result<TradeOutcome, EngineError> {
        match side.parse::<Side>() {
            Ok(side) => self.buy(side, amount),
            Err(_) => Ok(TradeOutcome::invalid_side()),
        }
    }

    /// What `buy` would return, and the state it would leave, without
    /// touching `self`.
    ///
    /// # Errors
    /// Same as `buy`.
    pub fn preview_buy(
        &self,
        side: Side,
        amount: Decimal,
    ) -> Result<(TradeOutcome, Self), EngineError> {
        let mut next = *self;
        let outcome = next.buy(side, amount)?;
        Ok((outcome, next))
    }
}
