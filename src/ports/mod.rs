//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MarketRepository`: versioned reserve-state persistence and trade log

pub mod repository;

pub use repository::{MarketRecord, MarketRepository, SaveOutcome, TradeRecord};
