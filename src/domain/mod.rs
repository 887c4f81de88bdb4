//! Domain layer - The market engine.
//!
//! Pure, synchronous value transformations over one market's
//! `ReserveState`. No I/O, no logging, no storage references
//! (hexagonal architecture inner ring). All reserve arithmetic uses
//! `rust_decimal::Decimal`; binary floating point never touches it.
//!
//! - `market`: reserve state, sides, construction
//! - `pricing`: spot prices and implied probability
//! - `executor`: buy orders and the slippage guard
//! - `profit`: payout estimate and market snapshot

pub mod error;
pub mod executor;
pub mod market;
pub mod pricing;
pub mod profit;

// Re-export core types for convenience
pub use error::EngineError;
pub use executor::{TradeOutcome, TradeStatus};
pub use market::{MarketId, ReserveState, Side, DEFAULT_SEED};
pub use profit::MarketSnapshot;
