//! Repository Port - Market State Persistence Interface
//!
//! The engine never touches storage. Callers load a market's reserve
//! state through this port, run the engine on it, and write the result
//! back. Writes are version-checked (compare-and-swap) so concurrent
//! read-modify-write cycles on one market cannot interleave silently.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{MarketId, ReserveState, Side, TradeStatus};

/// A market's persisted reserve state plus its optimistic-lock version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketRecord {
  /// Market identifier.
  pub market_id: MarketId,
  /// Human-readable question shown to users.
  pub question: String,
  /// Incremented on every successful save; 0 for a never-saved market.
  pub version: u64,
  /// Reserve state as of `version`.
  pub state: ReserveState,
  /// Time of the last successful save.
  pub updated_at: DateTime<Utc>,
}

impl MarketRecord {
  /// A fresh, never-saved record.
  pub fn new(market_id: MarketId, question: String, state: ReserveState) -> Self {
    Self {
      market_id,
      question,
      version: 0,
      state,
      updated_at: Utc::now(),
    }
  }
}

/// Result of a version-checked save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
  /// Stored; the record now carries `version`.
  Saved { version: u64 },
  /// The stored version differed from the expected one; nothing written.
  Conflict { current_version: u64 },
}

/// A single trade record for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
  /// Unique trade identifier.
  pub id: String,
  /// Market this trade belongs to.
  pub market_id: MarketId,
  /// Side bought.
  pub side: Side,
  /// Amount paid in.
  pub amount: Decimal,
  /// Shares received (zero when rejected).
  pub shares_received: Decimal,
  /// Price of the bought side reported by the engine.
  pub price: Decimal,
  /// Fill status.
  pub status: TradeStatus,
  /// Market version the trade produced (or was evaluated against if rejected).
  pub market_version: u64,
  /// Timestamp (Unix ms).
  pub timestamp_ms: i64,
}

/// Trait for market state persistence providers.
#[async_trait]
pub trait MarketRepository: Send + Sync + 'static {
  /// Load the current record for a market, if it exists.
  async fn load_market(&self, market_id: &str) -> anyhow::Result<Option<MarketRecord>>;

  /// Store `record` only if the stored version equals `expected_version`
  /// (0 means "must not exist yet").
  async fn save_market(
    &self,
    record: &MarketRecord,
    expected_version: u64,
  ) -> anyhow::Result<SaveOutcome>;

  /// Identifiers of all stored markets.
  async fn list_markets(&self) -> anyhow::Result<Vec<MarketId>>;

  /// Append a trade record to the market's trade log.
  async fn append_trade(&self, record: &TradeRecord) -> anyhow::Result<()>;

  /// Load all trade records for a market, oldest first.
  async fn load_trades(&self, market_id: &str) -> anyhow::Result<Vec<TradeRecord>>;

  /// Check if the repository is healthy (disk space, permissions).
  async fn is_healthy(&self) -> bool;
}
