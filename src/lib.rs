//! Portfolio analytics core.
//!
//! Pure, on-demand computations over externally supplied price series:
//! risk/return metrics (Sharpe ratio, volatility, beta, max drawdown),
//! benchmark comparison, technical indicators (moving averages, RSI, MACD)
//! and sector allocation. Price data and sector metadata come from injected
//! collaborators ([`external::PriceProvider`], [`external::SectorLookup`]);
//! this crate performs no I/O of its own beyond calling them, and owns no
//! persistent state beyond an injected TTL series cache.
//!
//! Degenerate-but-computable metrics are reported as `None` fields inside an
//! `Ok` result; inputs that make a computation meaningless fail with a
//! specific [`AnalyticsError`] variant.

pub mod config;
pub mod errors;
pub mod external;
pub mod models;
pub mod services;

pub use config::AnalyticsConfig;
pub use errors::AnalyticsError;
pub use services::analytics_service::{
    compute_analytics, compute_benchmark, compute_indicators, compute_sector_allocation,
    valuate_portfolio,
};
pub use services::series_cache::SeriesCache;
