//! Prediction AMM — Library Root
//!
//! Constant-product pricing and trade execution for binary YES/NO
//! prediction markets. Re-exports all modules for integration tests
//! and benchmarks.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
