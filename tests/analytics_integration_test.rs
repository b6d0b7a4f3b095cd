//! End-to-end tests for the analytics services, driven through an in-memory
//! price provider fixture instead of a live market-data API.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use portfolio_analytics::external::{PriceProvider, PriceProviderError};
use portfolio_analytics::models::{Holding, Interval, MacdTrend, Period, PricePoint, RsiSignal};
use portfolio_analytics::services::analytics_service;
use portfolio_analytics::{AnalyticsConfig, AnalyticsError, SeriesCache};

struct FixtureProvider {
    histories: HashMap<String, Vec<PricePoint>>,
    quotes: HashMap<String, f64>,
    history_calls: AtomicUsize,
    failing: AtomicBool,
}

impl FixtureProvider {
    fn new() -> Self {
        Self {
            histories: HashMap::new(),
            quotes: HashMap::new(),
            history_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    fn with_history(mut self, ticker: &str, series: Vec<PricePoint>) -> Self {
        self.histories.insert(ticker.to_string(), series);
        self
    }

    fn with_quote(mut self, ticker: &str, price: f64) -> Self {
        self.quotes.insert(ticker.to_string(), price);
        self
    }

    fn fail_from_now_on(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl PriceProvider for FixtureProvider {
    async fn fetch_history(
        &self,
        ticker: &str,
        _period: Period,
        _interval: Interval,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PriceProviderError::Network("connection refused".into()));
        }
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.histories
            .get(ticker)
            .cloned()
            .ok_or_else(|| PriceProviderError::UnknownTicker(ticker.to_string()))
    }

    async fn fetch_current_price(&self, ticker: &str) -> Result<f64, PriceProviderError> {
        self.quotes
            .get(ticker)
            .copied()
            .ok_or_else(|| PriceProviderError::UnknownTicker(ticker.to_string()))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// A drifting, oscillating series: always positive, with real dips.
fn wavy_series(n: usize, scale: f64) -> Vec<PricePoint> {
    (0..n)
        .map(|i| {
            let close = (100.0 + 10.0 * (i as f64 * 0.35).sin() + i as f64 * 0.15) * scale;
            PricePoint::new(start_date() + Duration::days(i as i64), close)
        })
        .collect()
}

fn uptrend_series(n: usize) -> Vec<PricePoint> {
    (0..n)
        .map(|i| PricePoint::new(start_date() + Duration::days(i as i64), 100.0 + i as f64))
        .collect()
}

fn config() -> AnalyticsConfig {
    AnalyticsConfig::default()
}

#[tokio::test]
async fn analytics_for_portfolio_tracking_the_benchmark_has_beta_one() {
    init_tracing();
    // Both holdings are scaled copies of SPY, so their returns are SPY's
    // returns and the value-weighted portfolio must have beta 1.
    let provider = FixtureProvider::new()
        .with_history("SPY", wavy_series(60, 1.0))
        .with_history("BIG", wavy_series(60, 2.0))
        .with_history("SMALL", wavy_series(60, 0.5));
    let cache = SeriesCache::new(300);
    let holdings = vec![Holding::new("BIG", 10.0, 150.0), Holding::new("SMALL", 40.0, 60.0)];

    let metrics = analytics_service::compute_analytics(&provider, &cache, &config(), &holdings)
        .await
        .unwrap();

    assert!((metrics.beta.unwrap() - 1.0).abs() < 1e-9);
    assert!(metrics.volatility > 0.0);
    assert!(metrics.sharpe_ratio.is_some());
    assert!(metrics.max_drawdown < 0.0, "oscillating series must draw down");
    assert!(metrics.max_drawdown >= -100.0);
}

#[tokio::test]
async fn analytics_without_benchmark_data_still_returns_other_metrics() {
    let provider = FixtureProvider::new().with_history("AAPL", wavy_series(60, 1.0));
    let cache = SeriesCache::new(300);
    let holdings = vec![Holding::new("AAPL", 5.0, 120.0)];

    let metrics = analytics_service::compute_analytics(&provider, &cache, &config(), &holdings)
        .await
        .unwrap();

    assert!(metrics.beta.is_none());
    assert!(metrics.volatility > 0.0);
    assert!(metrics.sharpe_ratio.is_some());
}

#[tokio::test]
async fn analytics_rejects_empty_portfolio() {
    let provider = FixtureProvider::new();
    let cache = SeriesCache::new(300);

    let err = analytics_service::compute_analytics(&provider, &cache, &config(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::EmptyPortfolio));
}

#[tokio::test]
async fn analytics_fails_when_no_holding_has_history() {
    let provider = FixtureProvider::new().with_history("SPY", wavy_series(60, 1.0));
    let cache = SeriesCache::new(300);
    let holdings = vec![Holding::new("NOPE", 1.0, 1.0)];

    let err = analytics_service::compute_analytics(&provider, &cache, &config(), &holdings)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::InsufficientData(_)));
}

#[tokio::test]
async fn benchmark_comparison_of_tracking_portfolio_is_flat() {
    let provider = FixtureProvider::new()
        .with_history("SPY", wavy_series(60, 1.0))
        .with_history("BIG", wavy_series(60, 2.0));
    let cache = SeriesCache::new(300);
    let holdings = vec![Holding::new("BIG", 10.0, 150.0)];

    let cmp = analytics_service::compute_benchmark(&provider, &cache, &config(), &holdings, "SPY")
        .await
        .unwrap();

    assert!(cmp.alpha.abs() < 1e-9);
    assert!(cmp.outperformance.abs() < 1e-9);
    assert_eq!(cmp.benchmark.ticker, "SPY");
    assert!(cmp.portfolio.volatility > 0.0);
}

#[tokio::test]
async fn benchmark_comparison_surfaces_missing_benchmark() {
    let provider = FixtureProvider::new().with_history("AAPL", wavy_series(60, 1.0));
    let cache = SeriesCache::new(300);
    let holdings = vec![Holding::new("AAPL", 5.0, 120.0)];

    let err =
        analytics_service::compute_benchmark(&provider, &cache, &config(), &holdings, "NOPE")
            .await
            .unwrap_err();
    assert!(matches!(err, AnalyticsError::BenchmarkUnavailable(_)));
}

#[tokio::test]
async fn indicator_snapshot_for_a_steady_uptrend() {
    let provider = FixtureProvider::new().with_history("AAPL", uptrend_series(60));
    let cache = SeriesCache::new(300);

    let snap = analytics_service::compute_indicators(
        &provider,
        &cache,
        &config(),
        "AAPL",
        Period::SixMonths,
    )
    .await
    .unwrap();

    assert!(snap.moving_averages.ma_20.is_some());
    assert!(snap.moving_averages.ma_50.is_some());
    assert!(snap.moving_averages.ma_200.is_none(), "only 60 points available");

    assert_eq!(snap.rsi.value, Some(100.0));
    assert_eq!(snap.rsi.signal, Some(RsiSignal::Overbought));

    let macd = snap.macd.macd.unwrap();
    let signal = snap.macd.signal.unwrap();
    assert_eq!(snap.macd.histogram, Some(macd - signal));
    assert_eq!(snap.macd.trend, Some(MacdTrend::Bullish));
}

#[tokio::test]
async fn indicators_fail_for_unknown_ticker() {
    let provider = FixtureProvider::new();
    let cache = SeriesCache::new(300);

    let err = analytics_service::compute_indicators(
        &provider,
        &cache,
        &config(),
        "NOPE",
        Period::SixMonths,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
}

#[tokio::test]
async fn repeated_requests_are_served_from_cache() {
    let provider = FixtureProvider::new().with_history("AAPL", uptrend_series(60));
    let cache = SeriesCache::new(300);

    for _ in 0..3 {
        analytics_service::compute_indicators(
            &provider,
            &cache,
            &config(),
            "AAPL",
            Period::SixMonths,
        )
        .await
        .unwrap();
    }

    assert_eq!(provider.history_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stale_cache_entry_is_served_when_provider_goes_down() {
    init_tracing();
    let provider = FixtureProvider::new().with_history("AAPL", uptrend_series(60));
    // TTL of zero: every entry is stale the moment it lands.
    let cache = SeriesCache::new(0);

    analytics_service::compute_indicators(&provider, &cache, &config(), "AAPL", Period::SixMonths)
        .await
        .unwrap();

    provider.fail_from_now_on();

    let snap = analytics_service::compute_indicators(
        &provider,
        &cache,
        &config(),
        "AAPL",
        Period::SixMonths,
    )
    .await
    .unwrap();
    assert_eq!(snap.ticker, "AAPL");
}

#[tokio::test]
async fn sector_allocation_splits_evenly_across_two_sectors() {
    let provider = FixtureProvider::new()
        .with_quote("AAPL", 100.0)
        .with_quote("JPM", 50.0);
    let sectors: HashMap<String, String> = [
        ("AAPL".to_string(), "Technology".to_string()),
        ("JPM".to_string(), "Financials".to_string()),
    ]
    .into_iter()
    .collect();
    // 10 * 100 = 1000 in Technology, 20 * 50 = 1000 in Financials.
    let holdings = vec![Holding::new("AAPL", 10.0, 80.0), Holding::new("JPM", 20.0, 40.0)];

    let allocation =
        analytics_service::compute_sector_allocation(&provider, &sectors, &holdings)
            .await
            .unwrap();

    assert_eq!(allocation["Technology"].value, 1000.0);
    assert_eq!(allocation["Technology"].percentage, 50.0);
    assert_eq!(allocation["Financials"].value, 1000.0);
    assert_eq!(allocation["Financials"].percentage, 50.0);

    let sum: f64 = allocation.values().map(|s| s.percentage).sum();
    assert!((sum - 100.0).abs() < 0.01);
}

#[tokio::test]
async fn valuation_propagates_missing_quotes() {
    let provider = FixtureProvider::new().with_quote("AAPL", 100.0);
    let holdings = vec![Holding::new("AAPL", 1.0, 1.0), Holding::new("NOPE", 1.0, 1.0)];

    let err = analytics_service::valuate_portfolio(&provider, &holdings)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
}

#[tokio::test]
async fn valuation_totals_and_percentages() {
    let provider = FixtureProvider::new()
        .with_quote("AAPL", 150.0)
        .with_quote("JPM", 40.0);
    let holdings = vec![Holding::new("AAPL", 10.0, 100.0), Holding::new("JPM", 20.0, 50.0)];

    let summary = analytics_service::valuate_portfolio(&provider, &holdings)
        .await
        .unwrap();

    assert_eq!(summary.total_value, 1500.0 + 800.0);
    assert_eq!(summary.total_cost, 1000.0 + 1000.0);
    assert_eq!(summary.total_gain_loss, 300.0);
    assert_eq!(summary.total_gain_loss_pct, Some(15.0));
}
