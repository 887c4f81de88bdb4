//! Persistence Adapters - JSON File Storage
//!
//! Implements the `MarketRepository` port using atomic, versioned JSON
//! snapshots for market reserves and append-only JSONL files for
//! trade records. No database dependency. Lightweight and
//! crash-recoverable.

pub mod market_store;
pub mod repository_impl;
pub mod trades;

pub use market_store::MarketStore;
pub use repository_impl::RepositoryImpl;
pub use trades::TradeLogger;
