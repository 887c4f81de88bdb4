//! Property-Based Tests — Engine Invariants
//!
//! Uses `proptest` to verify that the reserve engine maintains its
//! pricing and bookkeeping invariants across random inputs.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use prediction_amm::domain::{ReserveState, Side, TradeStatus};

/// Decimal with up to four fractional digits in `[lo, hi)` (given in ten-thousandths).
fn decimal_in(lo: i64, hi: i64) -> impl Strategy<Value = Decimal> {
    (lo..hi).prop_map(|units| Decimal::new(units, 4))
}

fn side() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Yes), Just(Side::No)]
}

fn tolerance() -> Decimal {
    dec!(0.000000001)
}

// ── Pricing Calculator Properties ───────────────────────────

proptest! {
    /// Prices are complementary for any non-degenerate seed pair.
    #[test]
    fn prices_sum_to_one_after_construction(
        yes in decimal_in(1, 100_000_000_000),
        no in decimal_in(1, 100_000_000_000),
    ) {
        let state = ReserveState::new(yes, no).unwrap();
        let sum = state.price(Side::Yes) + state.price(Side::No);
        prop_assert!((sum - Decimal::ONE).abs() < tolerance(), "sum = {sum}");
    }

    /// Prices stay inside the unit interval, zero reserves included.
    #[test]
    fn prices_in_unit_interval(
        yes in decimal_in(0, 100_000_000_000),
        no in decimal_in(0, 100_000_000_000),
        side in side(),
    ) {
        let state = ReserveState::new(yes, no).unwrap();
        let price = state.price(side);
        prop_assert!(price >= Decimal::ZERO && price <= Decimal::ONE, "price = {price}");
        let prob = state.implied_probability();
        prop_assert!(prob >= Decimal::ZERO && prob <= Decimal::ONE_HUNDRED);
    }

    /// Snapshots never change without an intervening trade.
    #[test]
    fn snapshot_idempotent(
        yes in decimal_in(0, 10_000_000_000),
        no in decimal_in(0, 10_000_000_000),
    ) {
        let state = ReserveState::new(yes, no).unwrap();
        prop_assert_eq!(state.snapshot(), state.snapshot());
    }
}

// ── Trade Executor Properties ───────────────────────────────

proptest! {
    /// Every committed trade in a sequence keeps prices complementary
    /// and yields non-negative shares.
    #[test]
    fn trade_sequences_preserve_invariants(
        yes in decimal_in(10_000, 100_000_000),
        no in decimal_in(10_000, 100_000_000),
        trades in prop::collection::vec((side(), decimal_in(1, 50_000_000)), 1..20),
    ) {
        let mut state = ReserveState::new(yes, no).unwrap();
        for (side, amount) in trades {
            let outcome = state.buy(side, amount).unwrap();
            prop_assert!(outcome.shares_received >= Decimal::ZERO);
            prop_assert!(state.yes_reserve() >= Decimal::ZERO);
            prop_assert!(state.no_reserve() >= Decimal::ZERO);
            let sum = state.price(Side::Yes) + state.price(Side::No);
            prop_assert!((sum - Decimal::ONE).abs() < tolerance(), "sum = {sum}");
        }
    }

    /// A filled trade records the product of the new reserves and
    /// reports the post-trade price.
    #[test]
    fn filled_trade_recomputes_product(
        yes in decimal_in(10_000, 100_000_000),
        no in decimal_in(10_000, 100_000_000),
        side in side(),
        amount in decimal_in(1, 100_000_000),
    ) {
        let mut state = ReserveState::new(yes, no).unwrap();
        let outcome = state.buy(side, amount).unwrap();
        if outcome.status == TradeStatus::Filled {
            prop_assert_eq!(state.constant_product(), state.yes_reserve() * state.no_reserve());
            prop_assert_eq!(outcome.price, state.price(side));
        }
    }

    /// An inflated product always triggers the guard and leaves the
    /// reserves untouched.
    #[test]
    fn inflated_product_always_rejected(
        yes in decimal_in(10_000, 10_000_000),
        no in decimal_in(10_000, 10_000_000),
        side in side(),
        amount in decimal_in(1, 1_000_000),
    ) {
        // k large enough that k / (own + amount) > other for every draw
        let k = (yes + dec!(100)) * no * dec!(1000);
        let mut state = ReserveState::from_parts(yes, no, k).unwrap();
        let before = state;
        let outcome = state.buy(side, amount).unwrap();
        prop_assert_eq!(outcome.status, TradeStatus::Rejected);
        prop_assert!(outcome.shares_received.is_zero());
        prop_assert_eq!(state, before);
    }

    /// Non-positive amounts never mutate the state.
    #[test]
    fn non_positive_amount_errors(
        amount in decimal_in(-1_000_000, 1),
        side in side(),
    ) {
        let mut state = ReserveState::default();
        prop_assert!(state.buy(side, amount).is_err());
        prop_assert_eq!(state, ReserveState::default());
    }
}

// ── Profit Estimator Properties ─────────────────────────────

proptest! {
    /// The estimate never exceeds the amount for positive amounts.
    #[test]
    fn profit_bounded_by_amount(
        yes in decimal_in(0, 10_000_000_000),
        no in decimal_in(0, 10_000_000_000),
        side in side(),
        amount in decimal_in(0, 10_000_000_000),
    ) {
        let state = ReserveState::new(yes, no).unwrap();
        let profit = state.potential_profit(side, amount);
        prop_assert!(profit >= Decimal::ZERO);
        prop_assert!(profit <= amount);
    }
}
