use crate::models::{Interval, Period};

/// Tunables for the analytics services.
///
/// Defaults follow common dashboard conventions: one year of daily history,
/// a 2% annual risk-free rate, SPY as the benchmark, and a five-minute
/// series cache.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Annual risk-free rate as a fraction (0.02 for 2%)
    pub risk_free_rate: f64,
    /// History window used for portfolio metrics and benchmark comparison
    pub history_period: Period,
    /// Sampling interval of fetched series
    pub interval: Interval,
    /// Ticker used for beta and benchmark comparison when none is given
    pub benchmark_ticker: String,
    /// How long a fetched series stays fresh in the cache
    pub cache_ttl_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            history_period: Period::OneYear,
            interval: Interval::Daily,
            benchmark_ticker: "SPY".to_string(),
            cache_ttl_secs: 300,
        }
    }
}

impl AnalyticsConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            risk_free_rate: std::env::var("RISK_FREE_RATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.risk_free_rate),
            history_period: std::env::var("HISTORY_PERIOD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.history_period),
            interval: std::env::var("HISTORY_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.interval),
            benchmark_ticker: std::env::var("BENCHMARK_TICKER")
                .unwrap_or(defaults.benchmark_ticker),
            cache_ttl_secs: std::env::var("PRICE_CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl_secs),
        }
    }
}
