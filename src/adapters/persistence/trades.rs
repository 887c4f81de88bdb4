//! Trade Logger - Append-only JSONL Trade Records
//!
//! Persists trade records to per-market JSONL files in the format
//! `trades/<market_id>.jsonl`. Each line is a self-contained JSON
//! record for easy parsing, streaming, and crash recovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use super::market_store::validate_market_id;
use crate::ports::repository::TradeRecord;

/// Append-only JSONL trade logger, one file per market.
pub struct TradeLogger {
    /// Base directory for trade files.
    trades_dir: PathBuf,
}

impl TradeLogger {
    /// Create a new trade logger in the given data directory.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        let trades_dir = data_dir.join("trades");

        fs::create_dir_all(&trades_dir)
            .await
            .context("Failed to create trades directory")?;

        Ok(Self { trades_dir })
    }

    /// Append a trade record to its market's JSONL file.
    #[instrument(skip(self, record), fields(trade_id = %record.id, market_id = %record.market_id))]
    pub async fn append_trade(&self, record: &TradeRecord) -> Result<()> {
        let path = self.path_for(&record.market_id)?;

        let mut json =
            serde_json::to_string(record).context("Failed to serialize trade record")?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .context("Failed to open trade log file")?;

        file
            .write_all(json.as_bytes())
            .await
            .context("Failed to write trade record")?;

        file.flush().await.context("Failed to flush trade log")?;

        Ok(())
    }

    /// Load all trade records for a market, sorted by timestamp.
    #[instrument(skip(self))]
    pub async fn load_trades(&self, market_id: &str) -> Result<Vec<TradeRecord>> {
        let path = self.path_for(market_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path).await?;
        let mut trades = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TradeRecord>(line) {
                Ok(record) => trades.push(record),
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        error = %e,
                        "Skipping malformed trade record"
                    );
                }
            }
        }

        trades.sort_by_key(|t| t.timestamp_ms);
        debug!(count = trades.len(), "Loaded trade records");
        Ok(trades)
    }

    /// Check if the trades directory is writable.
    pub async fn is_healthy(&self) -> bool {
        let test_path = self.trades_dir.join(".health_check");
        let result = fs::write(&test_path, b"ok").await;
        let _ = fs::remove_file(&test_path).await;
        result.is_ok()
    }

    fn path_for(&self, market_id: &str) -> Result<PathBuf> {
        validate_market_id(market_id)?;
        Ok(self.trades_dir.join(format!("{market_id}.jsonl")))
    }
}
