//! Repository Implementation — Concrete Adapter for the Repository Port
//!
//! Wraps `MarketStore` (versioned JSON snapshots) and `TradeLogger`
//! (JSONL append-only files) into a single struct that implements the
//! `MarketRepository` trait from `crate::ports::repository`.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use super::market_store::MarketStore;
use super::trades::TradeLogger;
use crate::domain::MarketId;
use crate::ports::repository::{MarketRecord, MarketRepository, SaveOutcome, TradeRecord};

/// Concrete repository adapter combining market and trade persistence.
pub struct RepositoryImpl {
    /// Versioned market snapshots.
    market_store: MarketStore,
    /// JSONL trade logger.
    trade_logger: TradeLogger,
}

impl RepositoryImpl {
    /// Create a new repository from existing store and logger instances.
    pub const fn new(market_store: MarketStore, trade_logger: TradeLogger) -> Self {
        Self {
            market_store,
            trade_logger,
        }
    }

    /// Create a new repository rooted at a data directory.
    ///
    /// Initializes both the market store and trade logger in the
    /// given directory, creating subdirectories as needed.
    pub async fn from_data_dir(data_dir: impl AsRef<Path>) -> Result<Self> {
        let dir = data_dir.as_ref();
        let market_store = MarketStore::new(dir).await?;
        let trade_logger = TradeLogger::new(dir).await?;
        Ok(Self::new(market_store, trade_logger))
    }
}

#[async_trait]
impl MarketRepository for RepositoryImpl {
    async fn load_market(&self, market_id: &str) -> Result<Option<MarketRecord>> {
        self.market_store.load(market_id).await
    }

    async fn save_market(&self, record: &MarketRecord, expected_version: u64) -> Result<SaveOutcome> {
        self.market_store.save(record, expected_version).await
    }

    async fn list_markets(&self) -> Result<Vec<MarketId>> {
        self.market_store.list().await
    }

    async fn append_trade(&self, record: &TradeRecord) -> Result<()> {
        self.trade_logger.append_trade(record).await
    }

    async fn load_trades(&self, market_id: &str) -> Result<Vec<TradeRecord>> {
        self.trade_logger.load_trades(market_id).await
    }

    async fn is_healthy(&self) -> bool {
        self.market_store.is_healthy().await && self.trade_logger.is_healthy().await
    }
}
