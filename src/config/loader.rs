//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::AppConfig;
use crate::adapters::persistence::market_store::validate_market_id;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    markets = config.markets.len(),
    data_dir = %config.persistence.data_dir,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-negative seed reserves
/// - Well-formed, unique market identifiers
/// - Sensible persistence and metrics settings
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.service.name.is_empty(),
    "service.name must not be empty"
  );

  anyhow::ensure!(
    config.defaults.yes_seed >= Decimal::ZERO && config.defaults.no_seed >= Decimal::ZERO,
    "Default seeds must be non-negative, got yes={} no={}",
    config.defaults.yes_seed,
    config.defaults.no_seed
  );

  let mut seen = HashSet::new();
  for (i, market) in config.markets.iter().enumerate() {
    validate_market_id(&market.id)
      .with_context(|| format!("Market {i} has an invalid id"))?;
    anyhow::ensure!(
      seen.insert(market.id.as_str()),
      "Market id '{}' is configured more than once",
      market.id
    );

    let seeds = market.seeds(&config.defaults);
    anyhow::ensure!(
      seeds.yes_seed >= Decimal::ZERO && seeds.no_seed >= Decimal::ZERO,
      "Market {} ({}) has a negative seed",
      i,
      market.id
    );
  }

  anyhow::ensure!(
    !config.persistence.data_dir.is_empty(),
    "persistence.data_dir must not be empty"
  );
  anyhow::ensure!(
    config.persistence.health_check_interval_seconds > 0,
    "persistence.health_check_interval_seconds must be positive"
  );

  if config.metrics.enabled {
    anyhow::ensure!(
      !config.metrics.bind_address.is_empty(),
      "metrics.bind_address must not be empty when metrics are enabled"
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  const SAMPLE: &str = r#"
    [service]
    name = "amm-test"

    [defaults]
    yes_seed = "500"

    [[markets]]
    id = "btc-100k"
    question = "Will BTC close above 100k?"

    [[markets]]
    id = "rain-tomorrow"
    question = "Will it rain tomorrow?"
    yes_seed = "250.5"
    no_seed = "750"
  "#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_parse_sample_applies_defaults() {
    let config = parse_config(SAMPLE).unwrap();
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.service.max_conflict_retries, 3);
    assert_eq!(config.persistence.data_dir, "data");
    assert_eq!(config.defaults.yes_seed, dec!(500));
    assert_eq!(config.defaults.no_seed, dec!(1000));

    let first = config.markets[0].seeds(&config.defaults);
    assert_eq!((first.yes_seed, first.no_seed), (dec!(500), dec!(1000)));

    let second = config.markets[1].seeds(&config.defaults);
    assert_eq!((second.yes_seed, second.no_seed), (dec!(250.5), dec!(750)));
  }

  #[test]
  fn test_negative_seed_rejected() {
    let toml = r#"
      [service]
      name = "amm-test"

      [[markets]]
      id = "bad"
      question = "?"
      no_seed = "-1"
    "#;
    assert!(parse_config(toml).is_err());
  }

  #[test]
  fn test_duplicate_market_rejected() {
    let toml = r#"
      [service]
      name = "amm-test"

      [[markets]]
      id = "dup"
      question = "a"

      [[markets]]
      id = "dup"
      question = "b"
    "#;
    let err = parse_config(toml).unwrap_err();
    assert!(err.to_string().contains("more than once"));
  }

  #[test]
  fn test_invalid_market_id_rejected() {
    let toml = r#"
      [service]
      name = "amm-test"

      [[markets]]
      id = "../escape"
      question = "?"
    "#;
    assert!(parse_config(toml).is_err());
  }
}
