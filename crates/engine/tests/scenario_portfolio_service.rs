use analytics::Performance;
use core_types::{ClientId, PortfolioEntry, Symbol};
use database::InMemoryStore;
use engine::{EngineError, INFRASTRUCTURE_MESSAGE, PortfolioService};
use price_history::PriceHistory;
use rust_decimal_macros::dec;
use std::io::Write;
use std::sync::Arc;
use validation::{PortfolioValidator, StaticSymbols};

const PRICE_LOG: &str = "AAA,10\nAAA,8\nAAA,9\nBBB,5\nBBB,6\nCCC,50\nDDD,7\n";

struct Fixture {
    _log: tempfile::NamedTempFile,
    service: PortfolioService,
}

fn fixture() -> Fixture {
    let mut log = tempfile::NamedTempFile::new().unwrap();
    log.write_all(PRICE_LOG.as_bytes()).unwrap();
    let service = service_over(PriceHistory::new(log.path()));
    Fixture { _log: log, service }
}

fn service_over(prices: PriceHistory) -> PortfolioService {
    // EEE is supported but never appears in the log.
    let supported = StaticSymbols::new(["AAA", "BBB", "CCC", "DDD", "EEE"]);
    PortfolioService::new(
        Arc::new(InMemoryStore::new()),
        prices,
        PortfolioValidator::new(Arc::new(supported)),
        30,
    )
}

fn entries(pairs: &[(&str, i64)]) -> Vec<PortfolioEntry> {
    pairs.iter().map(|(s, a)| PortfolioEntry::new(*s, *a)).collect()
}

async fn sample_client(service: &PortfolioService) -> ClientId {
    service
        .create_portfolio(&entries(&[("AAA", 2), ("BBB", 1)]))
        .await
        .unwrap()
}

#[tokio::test]
async fn scenario_valuation_uses_latest_prices() {
    let f = fixture();
    let id = sample_client(&f.service).await;
    assert_eq!(id, 1);

    let valuation = f.service.portfolio_value(id).await.unwrap();
    assert_eq!(valuation.total, dec!(25));
    assert_eq!(valuation.positions.len(), 2);
}

#[tokio::test]
async fn scenario_most_performing_and_most_stable() {
    let f = fixture();
    let id = sample_client(&f.service).await;

    assert_eq!(
        f.service.most_performing(id, 3).await.unwrap(),
        Performance::Rose {
            symbol: Symbol::from("AAA"),
            delta: dec!(1)
        }
    );

    let stable = f.service.most_stable(id, 3).await.unwrap();
    assert_eq!(stable.symbol.as_str(), "BBB");
    assert_eq!(stable.fluctuation, dec!(1));
}

#[tokio::test]
async fn scenario_nothing_rose_is_a_successful_answer() {
    let f = fixture();
    let id = f.service.create_portfolio(&entries(&[("BBB", 3)])).await.unwrap();
    assert_eq!(f.service.most_performing(id, 2).await.unwrap(), Performance::NoneRose);
}

#[tokio::test]
async fn scenario_partial_update_to_zero_removes_holding() {
    let f = fixture();
    let id = sample_client(&f.service).await;

    f.service
        .update_portfolio(id, &entries(&[("BBB", 0), ("AAA", 3)]))
        .await
        .unwrap();

    let holdings = f.service.client_holdings(id).await.unwrap();
    assert_eq!(holdings.len(), 1);
    assert_eq!(holdings[0].symbol.as_str(), "AAA");
    assert_eq!(holdings[0].amount, 3);
    assert_eq!(f.service.portfolio_value(id).await.unwrap().total, dec!(30));
}

#[tokio::test]
async fn scenario_partial_update_of_unheld_symbol_changes_nothing() {
    let f = fixture();
    let id = sample_client(&f.service).await;

    let err = f
        .service
        .update_portfolio(id, &entries(&[("AAA", 5), ("CCC", 1)]))
        .await
        .unwrap_err();
    assert!(matches!(&err, EngineError::InvalidArgument(msg) if msg.contains("CCC")));

    let holdings = f.service.client_holdings(id).await.unwrap();
    assert_eq!(holdings[0].amount, 2);
}

#[tokio::test]
async fn scenario_replace_round_trip() {
    let f = fixture();
    let id = sample_client(&f.service).await;

    f.service
        .replace_portfolio(id, &entries(&[("CCC", 1), ("DDD", 4)]))
        .await
        .unwrap();

    let held: Vec<(String, i64)> = f
        .service
        .client_holdings(id)
        .await
        .unwrap()
        .into_iter()
        .map(|h| (h.symbol.to_string(), h.amount))
        .collect();
    assert_eq!(held, vec![("CCC".to_string(), 1), ("DDD".to_string(), 4)]);
}

#[tokio::test]
async fn scenario_window_bounds_are_enforced() {
    let f = fixture();
    let id = sample_client(&f.service).await;

    for days in [0, 31] {
        assert!(matches!(
            f.service.most_performing(id, days).await,
            Err(EngineError::InvalidArgument(_))
        ));
    }
    assert!(f.service.most_performing(id, 30).await.is_ok());

    assert!(matches!(
        f.service.most_stable(id, 1).await,
        Err(EngineError::InvalidArgument(_))
    ));
    assert!(f.service.most_stable(id, 2).await.is_ok());
}

#[tokio::test]
async fn scenario_client_id_checks() {
    let f = fixture();
    sample_client(&f.service).await;

    for bad in [0, -4] {
        assert!(matches!(
            f.service.portfolio_value(bad).await,
            Err(EngineError::InvalidArgument(_))
        ));
    }
    assert!(matches!(
        f.service.portfolio_value(99).await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        f.service.replace_portfolio(99, &entries(&[("AAA", 1)])).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn scenario_empty_and_invalid_entries_are_rejected() {
    let f = fixture();
    assert!(matches!(
        f.service.create_portfolio(&[]).await,
        Err(EngineError::InvalidArgument(_))
    ));

    let id = sample_client(&f.service).await;
    assert!(matches!(
        f.service.update_portfolio(id, &[]).await,
        Err(EngineError::InvalidArgument(_))
    ));

    for bad in [
        entries(&[("AAA", 0)]),
        entries(&[("ZZZ", 1)]),
        entries(&[("aaa", 1)]),
        entries(&[("AAA", 1), ("AAA", 2)]),
    ] {
        assert!(matches!(
            f.service.create_portfolio(&bad).await,
            Err(EngineError::InvalidArgument(_))
        ));
    }

    // Only the first client was ever created.
    assert_eq!(f.service.list_clients().await.unwrap().len(), 1);
}

#[tokio::test]
async fn scenario_empty_portfolio_and_missing_prices_are_not_found() {
    let f = fixture();
    let id = f.service.create_portfolio(&entries(&[("AAA", 1)])).await.unwrap();
    f.service.update_portfolio(id, &entries(&[("AAA", 0)])).await.unwrap();

    assert!(matches!(
        f.service.portfolio_value(id).await,
        Err(EngineError::NotFound(_))
    ));
    assert!(matches!(
        f.service.most_stable(id, 5).await,
        Err(EngineError::NotFound(_))
    ));

    let unpriced = f.service.create_portfolio(&entries(&[("EEE", 1)])).await.unwrap();
    let err = f.service.portfolio_value(unpriced).await.unwrap_err();
    assert!(matches!(&err, EngineError::NotFound(msg) if msg.contains("EEE")));
    assert!(matches!(
        f.service.most_stable(unpriced, 5).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn scenario_best_unowned() {
    let f = fixture();
    let id = sample_client(&f.service).await;

    let best = f.service.best_unowned(id).await.unwrap().unwrap();
    assert_eq!(best.symbol.as_str(), "CCC");
    assert_eq!(best.price, dec!(50));

    let everything = f
        .service
        .create_portfolio(&entries(&[("AAA", 1), ("BBB", 1), ("CCC", 1), ("DDD", 1)]))
        .await
        .unwrap();
    assert!(f.service.best_unowned(everything).await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_missing_price_log_is_infrastructure() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_over(PriceHistory::new(dir.path().join("stocks.csv")));
    let id = sample_client(&service).await;

    let err = service.portfolio_value(id).await.unwrap_err();
    assert_eq!(err, EngineError::Infrastructure);
    assert_eq!(err.to_string(), INFRASTRUCTURE_MESSAGE);
}

#[tokio::test]
async fn scenario_listings() {
    let f = fixture();
    let first = sample_client(&f.service).await;
    let second = f.service.create_portfolio(&entries(&[("CCC", 9)])).await.unwrap();

    let clients = f.service.list_clients().await.unwrap();
    let ids: Vec<_> = clients.iter().map(|c| c.client_id).collect();
    assert_eq!(ids, vec![first, second]);
    assert_eq!(clients[1].holdings[0].amount, 9);

    assert_eq!(f.service.list_holdings().await.unwrap().len(), 3);
}

#[tokio::test]
async fn scenario_oversized_position_is_rejected_not_a_crash() {
    let mut log = tempfile::NamedTempFile::new().unwrap();
    log.write_all(b"AAA,10000000000\n").unwrap();
    let service = service_over(PriceHistory::new(log.path()));
    let id = service
        .create_portfolio(&entries(&[("AAA", i64::MAX)]))
        .await
        .unwrap();

    let err = service.portfolio_value(id).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(msg) if msg.contains("AAA")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn scenario_concurrent_reads_share_one_service() {
    let f = fixture();
    let id = sample_client(&f.service).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let service = f.service.clone();
            tokio::spawn(async move { service.portfolio_value(id).await })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap().total, dec!(25));
    }
}
