//! Trade Service - Serialized Read-Modify-Write Around the Engine
//!
//! The engine assumes exclusive access to the `ReserveState` it is
//! handed. This service provides that guarantee across callers:
//! - Loads the market through the `MarketRepository` port
//! - Runs the engine on a copy of the state
//! - Saves with a version check, retrying on conflict
//! - Appends an audit record for every evaluated trade

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::metrics::EngineMetrics;
use crate::config::{AppConfig, SeedConfig};
use crate::domain::{MarketSnapshot, ReserveState, Side, TradeOutcome, TradeStatus};
use crate::ports::repository::{MarketRecord, MarketRepository, SaveOutcome, TradeRecord};

/// What a caller gets back from a buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyReceipt {
  /// Market the trade was evaluated against.
  pub market_id: String,
  /// Engine result: shares, price, status.
  pub outcome: TradeOutcome,
  /// Market state after the trade (unchanged if not filled).
  pub snapshot: MarketSnapshot,
  /// Stored market version after the trade.
  pub version: u64,
}

/// Orchestrates engine calls against persisted markets.
pub struct TradeService<R: MarketRepository> {
  /// Persistence port.
  repository: Arc<R>,
  /// Optional metrics sink.
  metrics: Option<Arc<EngineMetrics>>,
  /// Retries after a version conflict before giving up.
  max_conflict_retries: u32,
}

impl<R: MarketRepository> TradeService<R> {
  /// Create a new trade service.
  pub const fn new(repository: Arc<R>, max_conflict_retries: u32) -> Self {
    Self {
      repository,
      metrics: None,
      max_conflict_retries,
    }
  }

  /// Attach a metrics registry.
  #[must_use]
  pub fn with_metrics(mut self, metrics: Arc<EngineMetrics>) -> Self {
    self.metrics = Some(metrics);
    self
  }

  /// Create and store a new market from two seed reserves.
  ///
  /// Fails if the market already exists or a seed is negative.
  #[instrument(skip(self, question))]
  pub async fn open_market(
    &self,
    market_id: &str,
    question: &str,
    yes_seed: Decimal,
    no_seed: Decimal,
  ) -> Result<MarketRecord> {
    let state = ReserveState::new(yes_seed, no_seed)?;
    let mut record = MarketRecord::new(market_id.to_string(), question.to_string(), state);

    match self.repository.save_market(&record, 0).await? {
      SaveOutcome::Saved { version } => {
        record.version = version;
        info!(
          yes_reserve = %state.yes_reserve(),
          no_reserve = %state.no_reserve(),
          "Market opened"
        );
        self.publish_price(market_id, &state);
        Ok(record)
      }
      SaveOutcome::Conflict { current_version } => {
        bail!("Market '{market_id}' already exists (version {current_version})")
      }
    }
  }

  /// Open every configured market that is not stored yet.
  ///
  /// Returns the number of markets created.
  pub async fn seed_from_config(&self, config: &AppConfig) -> Result<usize> {
    let mut created = 0;

    for market in &config.markets {
      if self.repository.load_market(&market.id).await?.is_some() {
        debug!(market_id = %market.id, "Market already stored, keeping persisted state");
        continue;
      }
      let SeedConfig { yes_seed, no_seed } = market.seeds(&config.defaults);
      self
        .open_market(&market.id, &market.question, yes_seed, no_seed)
        .await
        .with_context(|| format!("Failed to open configured market '{}'", market.id))?;
      created += 1;
    }

    let total = self.repository.list_markets().await?.len();
    if let Some(metrics) = &self.metrics {
      metrics
        .markets_open
        .set(i64::try_from(total).unwrap_or(i64::MAX));
    }

    info!(created, total, "Configured markets seeded");
    Ok(created)
  }

  /// Buy `amount` of `side` in a stored market.
  ///
  /// Invalid amounts surface as `EngineError::InvalidAmount` (reachable via
  /// `downcast_ref`). A guard rejection is a normal receipt with
  /// `TradeStatus::Rejected` and the market left as it was.
  #[instrument(skip(self))]
  pub async fn execute_buy(&self, market_id: &str, side: Side, amount: Decimal) -> Result<BuyReceipt> {
    for attempt in 0..=self.max_conflict_retries {
      let record = self.load_existing(market_id).await?;
      let (outcome, next_state) = record.state.preview_buy(side, amount)?;

      if !outcome.is_filled() {
        warn!(price = %outcome.price, "Trade rejected by slippage guard");
        self.record_trade(&record, side, amount, &outcome, record.version).await;
        return Ok(BuyReceipt {
          market_id: record.market_id,
          outcome,
          snapshot: record.state.snapshot(),
          version: record.version,
        });
      }

      let mut next = record.clone();
      next.state = next_state;

      match self.repository.save_market(&next, record.version).await? {
        SaveOutcome::Saved { version } => {
          info!(
            shares = %outcome.shares_received,
            price = %outcome.price,
            version,
            "Trade filled"
          );
          self.record_trade(&next, side, amount, &outcome, version).await;
          self.publish_price(market_id, &next_state);
          return Ok(BuyReceipt {
            market_id: next.market_id,
            outcome,
            snapshot: next_state.snapshot(),
            version,
          });
        }
        SaveOutcome::Conflict { current_version } => {
          warn!(
            attempt,
            expected = record.version,
            current = current_version,
            "Version conflict, retrying buy"
          );
          if let Some(metrics) = &self.metrics {
            metrics.observe_conflict(market_id);
          }
        }
      }
    }

    bail!(
      "Buy on market '{market_id}' abandoned after {} version conflicts",
      self.max_conflict_retries + 1
    )
  }

  /// Buy with a raw side string.
  ///
  /// An unrecognised side returns the `(0, 0)` `InvalidSide` receipt
  /// without touching storage.
  pub async fn execute_buy_str(&self, market_id: &str, side: &str, amount: Decimal) -> Result<BuyReceipt> {
    match side.parse::<Side>() {
      Ok(side) => self.execute_buy(market_id, side, amount).await,
      Err(e) => {
        warn!(market_id, error = %e, "Ignoring buy with invalid side");
        let record = self.load_existing(market_id).await?;
        if let Some(metrics) = &self.metrics {
          metrics.observe_trade(None, TradeStatus::InvalidSide, Decimal::ZERO);
        }
        Ok(BuyReceipt {
          market_id: record.market_id,
          outcome: TradeOutcome::invalid_side(),
          snapshot: record.state.snapshot(),
          version: record.version,
        })
      }
    }
  }

  /// Current prices and reserves of a stored market.
  pub async fn quote(&self, market_id: &str) -> Result<MarketSnapshot> {
    Ok(self.load_existing(market_id).await?.state.snapshot())
  }

  /// Display-only payout estimate for a hypothetical buy.
  pub async fn estimate_profit(&self, market_id: &str, side: Side, amount: Decimal) -> Result<Decimal> {
    let record = self.load_existing(market_id).await?;
    Ok(record.state.potential_profit(side, amount))
  }

  /// Audit trail of a market, oldest first.
  pub async fn trade_history(&self, market_id: &str) -> Result<Vec<TradeRecord>> {
    self.repository.load_trades(market_id).await
  }

  async fn load_existing(&self, market_id: &str) -> Result<MarketRecord> {
    self
      .repository
      .load_market(market_id)
      .await?
      .ok_or_else(|| anyhow!("Market '{market_id}' not found"))
  }

  /// Append the audit record and update metrics. The market snapshot is
  /// already committed at this point, so a log failure is only reported.
  async fn record_trade(
    &self,
    record: &MarketRecord,
    side: Side,
    amount: Decimal,
    outcome: &TradeOutcome,
    market_version: u64,
  ) {
    let trade = TradeRecord {
      id: Uuid::new_v4().to_string(),
      market_id: record.market_id.clone(),
      side,
      amount,
      shares_received: outcome.shares_received,
      price: outcome.price,
      status: outcome.status,
      market_version,
      timestamp_ms: Utc::now().timestamp_millis(),
    };

    if let Err(e) = self.repository.append_trade(&trade).await {
      warn!(trade_id = %trade.id, error = %e, "Failed to append trade record");
    }

    if let Some(metrics) = &self.metrics {
      metrics.observe_trade(Some(side), outcome.status, outcome.shares_received);
    }
  }

  fn publish_price(&self, market_id: &str, state: &ReserveState) {
    if let Some(metrics) = &self.metrics {
      metrics.set_price(market_id, state.price(Side::Yes));
    }
  }
}
