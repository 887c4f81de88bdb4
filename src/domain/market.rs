//! Reserve state of a binary constant-product market.
//!
//! Holds the two outcome reserves and the product recorded after the
//! last committed trade. There is no public mutation API: reserves
//! only change through `ReserveState::buy` (see `executor`), which keeps
//! the invariant bookkeeping in one place.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::EngineError;

/// Default seed for each reserve when the caller supplies none.
pub const DEFAULT_SEED: Decimal = dec!(1000);

/// Lightweight market identifier used at the ports boundary.
pub type MarketId = String;

/// Outcome side of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

impl Side {
    /// The complementary outcome.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
        }
    }
}

impl FromStr for Side {
    type Err = EngineError;

    /// Accepts exactly `yes` or `no`. Case and whitespace variants are invalid.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(EngineError::InvalidSide(s.to_string())),
        }
    }
}

/// The mutable value every engine operation works on.
///
/// `constant_product` is not enforced at read time. It is recomputed
/// from the live reserves after every committed trade, so it tracks the
/// pre-trade product only up to the rounding of the rebalancing division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReserveParts", into = "ReserveParts")]
pub struct ReserveState {
    pub(crate) yes_reserve: Decimal,
    pub(crate) no_reserve: Decimal,
    pub(crate) constant_product: Decimal,
}

impl ReserveState {
    /// Creates a market from two seed reserves, recording their product.
    ///
    /// Zero seeds are allowed and yield the degenerate 50/50 market.
    ///
    /// # Errors
    /// `NegativeReserve` for a negative seed, `Overflow` if the sum or
    /// product of the seeds is not representable.
    pub fn new(yes_seed: Decimal, no_seed: Decimal) -> Result<Self, EngineError> {
        ensure_non_negative("yes_reserve", yes_seed)?;
        ensure_non_negative("no_reserve", no_seed)?;
        yes_seed
            .checked_add(no_seed)
            .ok_or(EngineError::Overflow("reserve sum"))?;
        let constant_product = yes_seed
            .checked_mul(no_seed)
            .ok_or(EngineError::Overflow("constant product"))?;

        Ok(Self {
            yes_reserve: yes_seed,
            no_reserve: no_seed,
            constant_product,
        })
    }

    /// Restores a state exactly as a persistence layer stored it.
    ///
    /// The product is taken as given rather than recomputed, so a stale
    /// or inconsistent snapshot behaves the way it was recorded.
    ///
    /// # Errors
    /// `NegativeReserve` if any field is negative, `Overflow` if the
    /// reserve sum is not representable.
    pub fn from_parts(
        yes_reserve: Decimal,
        no_reserve: Decimal,
        constant_product: Decimal,
    ) -> Result<Self, EngineError> {
        ensure_non_negative("yes_reserve", yes_reserve)?;
        ensure_non_negative("no_reserve", no_reserve)?;
        ensure_non_negative("constant_product", constant_product)?;
        yes_reserve
            .checked_add(no_reserve)
            .ok_or(EngineError::Overflow("reserve sum"))?;

        Ok(Self {
            yes_reserve,
            no_reserve,
            constant_product,
        })
    }

    pub const fn yes_reserve(&self) -> Decimal {
        self.yes_reserve
    }

    pub const fn no_reserve(&self) -> Decimal {
        self.no_reserve
    }

    pub const fn constant_product(&self) -> Decimal {
        self.constant_product
    }

    /// Reserve backing the given side.
    pub const fn reserve(&self, side: Side) -> Decimal {
        match side {
            Side::Yes => self.yes_reserve,
            Side::No => self.no_reserve,
        }
    }
}

/// Wire shape of a `ReserveState`; deserialization re-validates it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ReserveParts {
    yes_reserve: Decimal,
    no_reserve: Decimal,
    constant_product: Decimal,
}

impl TryFrom<ReserveParts> for ReserveState {
    type Error = EngineError;

    fn try_from(parts: ReserveParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.yes_reserve, parts.no_reserve, parts.constant_product)
    }
}

impl From<ReserveState> for ReserveParts {
    fn from(state: ReserveState) -> Self {
        Self {
            yes_reserve: state.yes_reserve,
            no_reserve: state.no_reserve,
            constant_product: state.constant_product,
        }
    }
}

impl Default for ReserveState {
    /// A 1000/1000 market with product 1,000,000.
    fn default() -> Self {
        Self {
            yes_reserve: DEFAULT_SEED,
            no_reserve: DEFAULT_SEED,
            constant_product: DEFAULT_SEED * DEFAULT_SEED,
        }
    }
}

fn ensure_non_negative(field: &'static str, value: Decimal) -> Result<(), EngineError> {
    if value < Decimal::ZERO {
        return Err(EngineError::NegativeReserve { field, value });
    }
    Ok(())
}
