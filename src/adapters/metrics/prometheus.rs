//! Prometheus Metrics Registry - Engine Observability
//!
//! Registers and exposes Prometheus metrics for trade outcomes, fill
//! sizes, live market prices and optimistic-lock conflicts.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use crate::domain::{Side, TradeStatus};

/// Centralized Prometheus metrics for the market engine.
///
/// All metrics follow the naming convention `prediction_amm_*`.
pub struct EngineMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Trades processed, by status (filled / rejected / invalid_side).
    pub trades_total: IntCounterVec,
    /// Shares received per filled trade.
    pub shares_filled: HistogramVec,
    /// Current YES price per market (display only; f64 is fine here).
    pub price_yes: GaugeVec,
    /// Version conflicts hit while saving a market.
    pub version_conflicts: IntCounterVec,
    /// Number of markets known to the service.
    pub markets_open: IntGauge,
}

impl EngineMetrics {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let trades_total = IntCounterVec::new(
            Opts::new("prediction_amm_trades_total", "Trades processed by status"),
            &["status", "side"],
        )?;

        let shares_filled = HistogramVec::new(
            HistogramOpts::new(
                "prediction_amm_shares_filled",
                "Shares received per filled trade",
            )
            .buckets(vec![0.1, 1.0, 10.0, 50.0, 100.0, 500.0, 1000.0, 10000.0]),
            &["side"],
        )?;

        let price_yes = GaugeVec::new(
            Opts::new("prediction_amm_price_yes", "Current YES price per market"),
            &["market"],
        )?;

        let version_conflicts = IntCounterVec::new(
            Opts::new(
                "prediction_amm_version_conflicts_total",
                "Compare-and-swap conflicts while saving a market",
            ),
            &["market"],
        )?;

        let markets_open = IntGauge::new(
            "prediction_amm_markets_open",
            "Number of markets known to the service",
        )?;

        // Register all metrics
        registry.register(Box::new(trades_total.clone()))?;
        registry.register(Box::new(shares_filled.clone()))?;
        registry.register(Box::new(price_yes.clone()))?;
        registry.register(Box::new(version_conflicts.clone()))?;
        registry.register(Box::new(markets_open.clone()))?;

        Ok(Self {
            registry,
            trades_total,
            shares_filled,
            price_yes,
            version_conflicts,
            markets_open,
        })
    }

    /// Record the outcome of one buy; `None` side means it did not parse.
    pub fn observe_trade(&self, side: Option<Side>, status: TradeStatus, shares: Decimal) {
        let side = side.map_or_else(|| "invalid".to_string(), |s| s.to_string());
        self.trades_total
            .with_label_values(&[&status.to_string(), &side])
            .inc();
        if status == TradeStatus::Filled {
            self.shares_filled
                .with_label_values(&[&side])
                .observe(shares.to_f64().unwrap_or(0.0));
        }
    }

    /// Publish a market's current YES price.
    pub fn set_price(&self, market_id: &str, price_yes: Decimal) {
        self.price_yes
            .with_label_values(&[market_id])
            .set(price_yes.to_f64().unwrap_or(0.0));
    }

    /// Count one compare-and-swap conflict.
    pub fn observe_conflict(&self, market_id: &str) {
        self.version_conflicts.with_label_values(&[market_id]).inc();
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
        }
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move { metrics.render() }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}
