//! Spot prices and implied probability derived from reserves.
//!
//! Each side is priced by the OPPOSITE reserve over the total:
//!
//!   price_yes = no_reserve  / (yes_reserve + no_reserve)
//!   price_no  = yes_reserve / (yes_reserve + no_reserve)
//!
//! Buying a side grows that side's reserve, which lowers its own quote.
//! This polarity is the established pricing contract and is kept as is.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::market::{ReserveState, Side};

/// Price of both sides in a market whose reserves sum to zero.
pub const DEGENERATE_PRICE: Decimal = dec!(0.5);

impl ReserveState {
    /// Spot price of `side`, in `[0, 1]`.
    ///
    /// Returns exactly 0.5 when the reserves sum to zero.
    pub fn price(&self, side: Side) -> Decimal {
        // Construction and every committed trade guarantee the sum fits.
        let total = self.yes_reserve + self.no_reserve;
        if total.is_zero() {
            return DEGENERATE_PRICE;
        }
        self.reserve(side.opposite()) / total
    }

    /// YES price as a percentage in `[0, 100]`.
    pub fn implied_probability(&self) -> Decimal {
        self.price(Side::Yes) * Decimal::ONE_HUNDRED
    }
}
