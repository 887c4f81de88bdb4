//! Prediction AMM — Entry Point
//!
//! Hosts the market engine behind its persistence boundary and exposes
//! health and metrics endpoints. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Open the JSON repository under persistence.data_dir
//! 4. Seed configured markets that are not stored yet
//! 5. Spawn health server (/live + /ready) and metrics server (/metrics)
//! 6. Poll repository health until SIGINT → graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use prediction_amm::adapters::metrics::{EngineMetrics, HealthServer, HealthState};
use prediction_amm::adapters::persistence::RepositoryImpl;
use prediction_amm::config;
use prediction_amm::ports::MarketRepository;
use prediction_amm::usecases::TradeService;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());

    // ── 1. Load configuration ───────────────────────────────
    let config = config::loader::load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        markets = config.markets.len(),
        "Starting prediction AMM"
    );

    // ── 3. Repository + metrics + service ───────────────────
    let repository = Arc::new(
        RepositoryImpl::from_data_dir(&config.persistence.data_dir)
            .await
            .context("Failed to open repository")?,
    );
    let metrics = Arc::new(EngineMetrics::new().context("Failed to create metrics registry")?);
    let service = TradeService::new(Arc::clone(&repository), config.service.max_conflict_retries)
        .with_metrics(Arc::clone(&metrics));

    // ── 4. Seed configured markets ──────────────────────────
    service.seed_from_config(&config).await?;
    for market_id in repository.list_markets().await? {
        let snapshot = service.quote(&market_id).await?;
        metrics.set_price(&market_id, snapshot.price_yes);
        info!(
            market_id = %market_id,
            price_yes = %snapshot.price_yes,
            price_no = %snapshot.price_no,
            implied_probability = %snapshot.implied_probability,
            "Market loaded"
        );
    }

    // ── 5. Health + metrics servers ─────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let health = Arc::new(HealthState::new());

    let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
    let health_handle = tokio::spawn({
        let rx = shutdown_tx.subscribe();
        async move {
            if let Err(e) = health_server.run(rx).await {
                error!(error = %e, "Health server failed");
            }
        }
    });

    let metrics_handle = if config.metrics.enabled {
        let rx = shutdown_tx.subscribe();
        let bind = config.metrics.bind_address.clone();
        let metrics_ref = Arc::clone(&metrics);
        Some(tokio::spawn(async move {
            if let Err(e) = metrics_ref.serve(bind, rx).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    info!("Engine host running");

    // ── 6. Repository health loop until SIGINT ──────────────
    let interval = Duration::from_secs(config.persistence.health_check_interval_seconds);
    let shutdown_signal = signal::ctrl_c();
    tokio::pin!(shutdown_signal);
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!("SIGINT received, initiating graceful shutdown");
                break;
            }
            () = tokio::time::sleep(interval) => {
                let healthy = repository.is_healthy().await;
                if !healthy {
                    warn!("Repository health check failed");
                }
                health.repository_healthy.store(healthy, Ordering::Relaxed);
            }
        }
    }

    // ── Graceful shutdown ───────────────────────────────────
    health.accepting_trades.store(false, Ordering::Relaxed);
    let _ = shutdown_tx.send(());

    let _ = tokio::time::timeout(Duration::from_secs(5), health_handle).await;
    if let Some(handle) = metrics_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}
