//! Persistence Tests - JSON Market Store and JSONL Trade Log on Disk
//!
//! Exercises the real `RepositoryImpl` in a temporary directory,
//! including the version check that serializes concurrent buys.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use prediction_amm::adapters::persistence::RepositoryImpl;
use prediction_amm::config::loader::parse_config;
use prediction_amm::domain::{ReserveState, Side, TradeStatus};
use prediction_amm::ports::repository::{MarketRecord, MarketRepository, SaveOutcome};
use prediction_amm::usecases::TradeService;

async fn repository() -> (TempDir, Arc<RepositoryImpl>) {
    let dir = TempDir::new().unwrap();
    let repo = RepositoryImpl::from_data_dir(dir.path()).await.unwrap();
    (dir, Arc::new(repo))
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let (_dir, repo) = repository().await;
    let record = MarketRecord::new(
        "election".to_string(),
        "Will the incumbent win?".to_string(),
        ReserveState::new(dec!(1234.5678), dec!(0.0001)).unwrap(),
    );

    assert_eq!(
        repo.save_market(&record, 0).await.unwrap(),
        SaveOutcome::Saved { version: 1 }
    );

    let loaded = repo.load_market("election").await.unwrap().unwrap();
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.state, record.state);
    assert_eq!(loaded.question, record.question);
    assert!(repo.load_market("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_stale_version_is_refused() {
    let (_dir, repo) = repository().await;
    let record = MarketRecord::new("m1".to_string(), "?".to_string(), ReserveState::default());

    repo.save_market(&record, 0).await.unwrap();
    assert_eq!(
        repo.save_market(&record, 0).await.unwrap(),
        SaveOutcome::Conflict { current_version: 1 }
    );
    assert_eq!(
        repo.save_market(&record, 1).await.unwrap(),
        SaveOutcome::Saved { version: 2 }
    );
}

#[tokio::test]
async fn test_list_markets_sorted() {
    let (_dir, repo) = repository().await;
    for id in ["zeta", "alpha", "mid"] {
        let record = MarketRecord::new(id.to_string(), "?".to_string(), ReserveState::default());
        repo.save_market(&record, 0).await.unwrap();
    }
    assert_eq!(repo.list_markets().await.unwrap(), vec!["alpha", "mid", "zeta"]);
    assert!(repo.is_healthy().await);
}

#[tokio::test]
async fn test_corrupted_snapshot_fails_to_load() {
    let (dir, repo) = repository().await;
    let json = r#"{
        "market_id": "bad",
        "question": "?",
        "version": 3,
        "state": {"yes_reserve": "-5", "no_reserve": "10", "constant_product": "0"},
        "updated_at": "2026-01-01T00:00:00Z"
    }"#;
    std::fs::write(dir.path().join("markets").join("bad.json"), json).unwrap();

    assert!(repo.load_market("bad").await.is_err());
}

#[tokio::test]
async fn test_path_traversal_ids_rejected() {
    let (_dir, repo) = repository().await;
    assert!(repo.load_market("../outside").await.is_err());
}

#[tokio::test]
async fn test_service_end_to_end() {
    let (_dir, repo) = repository().await;
    let service = TradeService::new(Arc::clone(&repo), 3);

    let config = parse_config(
        r#"
        [service]
        name = "e2e"

        [[markets]]
        id = "btc-100k"
        question = "Will BTC hit 100k?"
        "#,
    )
    .unwrap();

    assert_eq!(service.seed_from_config(&config).await.unwrap(), 1);
    // Second run keeps the stored market
    assert_eq!(service.seed_from_config(&config).await.unwrap(), 0);

    let receipt = service.execute_buy("btc-100k", Side::Yes, dec!(100)).await.unwrap();
    assert_eq!(receipt.outcome.status, TradeStatus::Filled);
    assert_eq!(receipt.version, 2);

    let invalid = service.execute_buy_str("btc-100k", "maybe", dec!(100)).await.unwrap();
    assert_eq!(invalid.outcome.status, TradeStatus::InvalidSide);

    let quote = service.quote("btc-100k").await.unwrap();
    assert_eq!(quote.yes_reserve, dec!(1100));
    assert_eq!(quote, receipt.snapshot);

    let history = service.trade_history("btc-100k").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].shares_received, receipt.outcome.shares_received);
    assert_eq!(history[0].market_version, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_buys_are_serialized() {
    const BUYERS: usize = 8;

    let (_dir, repo) = repository().await;
    let service = Arc::new(TradeService::new(Arc::clone(&repo), BUYERS as u32));
    service
        .open_market("race", "?", dec!(1000), dec!(1000))
        .await
        .unwrap();

    let handles: Vec<_> = (0..BUYERS)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.execute_buy("race", Side::Yes, dec!(10)).await })
        })
        .collect();

    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        assert_eq!(receipt.outcome.status, TradeStatus::Filled);
    }

    // Identical buys applied one after another, no lost updates
    let mut expected = ReserveState::default();
    for _ in 0..BUYERS {
        expected.buy(Side::Yes, dec!(10)).unwrap();
    }

    let stored = repo.load_market("race").await.unwrap().unwrap();
    assert_eq!(stored.version, 1 + BUYERS as u64);
    assert_eq!(stored.state, expected);

    let trades = repo.load_trades("race").await.unwrap();
    assert_eq!(trades.len(), BUYERS);
    let total: Decimal = trades.iter().map(|t| t.amount).sum();
    assert_eq!(total, dec!(80));
}

#[tokio::test]
async fn test_malformed_trade_lines_skipped() {
    let (dir, repo) = repository().await;
    let service = TradeService::new(Arc::clone(&repo), 3);
    service.open_market("m2", "?", dec!(500), dec!(500)).await.unwrap();
    service.execute_buy("m2", Side::No, dec!(5)).await.unwrap();

    let log = dir.path().join("trades").join("m2.jsonl");
    let mut content = std::fs::read_to_string(&log).unwrap();
    content.push_str("{not json}\n");
    std::fs::write(&log, content).unwrap();

    service.execute_buy("m2", Side::No, dec!(5)).await.unwrap();
    assert_eq!(repo.load_trades("m2").await.unwrap().len(), 2);
}
