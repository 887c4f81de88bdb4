//! Engine Benchmarks — Hot-Path Performance Validation
//!
//! Benchmarks the domain calls made on every quote and every buy.
//!
//! Run with: cargo bench --bench engine_bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

use prediction_amm::domain::{ReserveState, Side};

/// Benchmark a single price read.
fn bench_price(c: &mut Criterion) {
    let state = ReserveState::new(dec!(1100), dec!(909.09)).unwrap();

    c.bench_function("price_yes", |b| {
        b.iter(|| {
            let _price = black_box(&state).price(black_box(Side::Yes));
        });
    });
}

/// Benchmark a filled buy against a fresh even market.
fn bench_buy(c: &mut Criterion) {
    c.bench_function("buy_yes_100", |b| {
        b.iter(|| {
            let mut state = ReserveState::default();
            let _outcome = state.buy(black_box(Side::Yes), black_box(dec!(100)));
        });
    });
}

/// Benchmark a buy rejected by the slippage guard.
fn bench_rejected_buy(c: &mut Criterion) {
    let corrupted = ReserveState::from_parts(dec!(1000), dec!(1000), dec!(2000000)).unwrap();

    c.bench_function("buy_rejected", |b| {
        b.iter(|| {
            let mut state = corrupted;
            let _outcome = state.buy(black_box(Side::No), black_box(dec!(100)));
        });
    });
}

/// Benchmark the full market snapshot.
fn bench_snapshot(c: &mut Criterion) {
    let state = ReserveState::new(dec!(1234.5678), dec!(876.5432)).unwrap();

    c.bench_function("snapshot", |b| {
        b.iter(|| {
            let _snapshot = black_box(&state).snapshot();
        });
    });
}

fn bench_potential_profit(c: &mut Criterion) {
    let state = ReserveState::default();

    c.bench_function("potential_profit", |b| {
        b.iter(|| {
            let _profit = state.potential_profit(black_box(Side::No), black_box(dec!(250)));
        });
    });
}

criterion_group!(
    benches,
    bench_price,
    bench_buy,
    bench_rejected_buy,
    bench_snapshot,
    bench_potential_profit,
);
criterion_main!(benches);
