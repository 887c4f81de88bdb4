//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the domain engine with port interfaces.
//!
//! Use cases:
//! - `TradeService`: open markets, execute buys with version-checked
//!   saves, quotes and profit estimates

pub mod trade_service;

pub use trade_service::{BuyReceipt, TradeService};
