//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! Seed reserves are written as decimal strings so they reach the
//! engine without passing through binary floating point.

pub mod loader;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::DEFAULT_SEED;

/// Top-level service configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the service begins operation.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and behaviour.
  pub service: ServiceConfig,
  /// Seeds used when a market does not override them.
  #[serde(default)]
  pub defaults: SeedConfig,
  /// Markets to open at startup if not already stored.
  #[serde(default)]
  pub markets: Vec<MarketConfig>,
  /// Persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// How many times a buy is retried after a version conflict.
  #[serde(default = "default_conflict_retries")]
  pub max_conflict_retries: u32,
}

/// Seed reserves for a new market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SeedConfig {
  /// Initial YES reserve.
  #[serde(default = "default_seed", with = "rust_decimal::serde::str")]
  pub yes_seed: Decimal,
  /// Initial NO reserve.
  #[serde(default = "default_seed", with = "rust_decimal::serde::str")]
  pub no_seed: Decimal,
}

impl Default for SeedConfig {
  fn default() -> Self {
    Self {
      yes_seed: DEFAULT_SEED,
      no_seed: DEFAULT_SEED,
    }
  }
}

/// Individual market configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
  /// Market identifier (also used as the snapshot file name).
  pub id: String,
  /// Question shown to users.
  pub question: String,
  /// YES seed override.
  #[serde(default, with = "rust_decimal::serde::str_option")]
  pub yes_seed: Option<Decimal>,
  /// NO seed override.
  #[serde(default, with = "rust_decimal::serde::str_option")]
  pub no_seed: Option<Decimal>,
}

impl MarketConfig {
  /// Seeds for this market, falling back to `defaults`.
  pub fn seeds(&self, defaults: &SeedConfig) -> SeedConfig {
    SeedConfig {
      yes_seed: self.yes_seed.unwrap_or(defaults.yes_seed),
      no_seed: self.no_seed.unwrap_or(defaults.no_seed),
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
  /// Directory for market snapshots and trade logs.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
  /// Interval between repository health checks (seconds).
  #[serde(default = "default_health_interval")]
  pub health_check_interval_seconds: u64,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      health_check_interval_seconds: default_health_interval(),
    }
  }
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_conflict_retries() -> u32 {
  3
}

const fn default_seed() -> Decimal {
  DEFAULT_SEED
}

fn default_data_dir() -> String {
  "data".to_string()
}

const fn default_health_interval() -> u64 {
  30
}

const fn default_true() -> bool {
  true
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

const fn default_health_port() -> u16 {
  8080
}
