//! Market Store - Atomic, Versioned JSON Market Snapshots
//!
//! Saves one `markets/<id>.json` file per market using atomic writes
//! (write to tmp file, then rename). Every save is version-checked
//! against the file on disk under a store-wide lock, so two callers
//! racing on the same market cannot both commit from the same base.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::domain::MarketId;
use crate::ports::repository::{MarketRecord, SaveOutcome};

/// Versioned JSON snapshot store, one file per market.
pub struct MarketStore {
    /// Directory holding `<id>.json` files.
    markets_dir: PathBuf,
    /// Serializes the check-then-write of `save`.
    write_lock: Mutex<()>,
}

impl MarketStore {
    /// Create a new market store in the given data directory.
    ///
    /// Creates `<data_dir>/markets` if it doesn't exist.
    pub async fn new(data_dir: &Path) -> Result<Self> {
        let markets_dir = data_dir.join("markets");
        fs::create_dir_all(&markets_dir)
            .await
            .context("Failed to create markets directory")?;

        Ok(Self {
            markets_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Load a market record; `None` if the market was never saved.
    #[instrument(skip(self))]
    pub async fn load(&self, market_id: &str) -> Result<Option<MarketRecord>> {
        let path = self.path_for(market_id)?;
        if !path.exists() {
            debug!("No snapshot for market");
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read market file {}", path.display()))?;

        let record: MarketRecord = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse market JSON {}", path.display()))?;

        Ok(Some(record))
    }

    /// Save a record if the stored version still equals `expected_version`.
    ///
    /// On success the file holds `record` with `version = expected + 1`
    /// and a fresh `updated_at`.
    #[instrument(skip(self, record), fields(market_id = %record.market_id))]
    pub async fn save(&self, record: &MarketRecord, expected_version: u64) -> Result<SaveOutcome> {
        let _guard = self.write_lock.lock().await;

        let current_version = self
            .load(&record.market_id)
            .await?
            .map_or(0, |stored| stored.version);

        if current_version != expected_version {
            warn!(
                expected = expected_version,
                current = current_version,
                "Version conflict, snapshot not written"
            );
            return Ok(SaveOutcome::Conflict { current_version });
        }

        let version = expected_version + 1;
        let mut stored = record.clone();
        stored.version = version;
        stored.updated_at = Utc::now();

        let json =
            serde_json::to_string_pretty(&stored).context("Failed to serialize market record")?;

        let path = self.path_for(&record.market_id)?;
        let tmp_path = path.with_extension("json.tmp");

        // Write to tmp file
        fs::write(&tmp_path, &json)
            .await
            .context("Failed to write tmp market file")?;

        // Atomic rename
        fs::rename(&tmp_path, &path)
            .await
            .context("Failed to rename market file")?;

        info!(version, path = %path.display(), "Market snapshot saved");
        Ok(SaveOutcome::Saved { version })
    }

    /// Identifiers of all stored markets, sorted.
    pub async fn list(&self) -> Result<Vec<MarketId>> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.markets_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }

        ids.sort();
        Ok(ids)
    }

    /// Check if the markets directory is writable.
    pub async fn is_healthy(&self) -> bool {
        let test_path = self.markets_dir.join(".health_check");
        let result = fs::write(&test_path, b"ok").await;
        let _ = fs::remove_file(&test_path).await;
        result.is_ok()
    }

    fn path_for(&self, market_id: &str) -> Result<PathBuf> {
        validate_market_id(market_id)?;
        Ok(self.markets_dir.join(format!("{market_id}.json")))
    }
}

/// Market IDs double as file names: ASCII alphanumerics, `-` and `_` only.
pub fn validate_market_id(market_id: &str) -> Result<()> {
    anyhow::ensure!(!market_id.is_empty(), "Market id must not be empty");
    anyhow::ensure!(
        market_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
        "Market id '{market_id}' may only contain ASCII letters, digits, '-' and '_'"
    );
    Ok(())
}
