use std::collections::BTreeMap;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::AnalyticsConfig;
use crate::errors::AnalyticsError;
use crate::external::{PriceProvider, SectorLookup};
use crate::models::{
    BenchmarkComparison, Holding, Interval, Period, PortfolioMetrics, PortfolioSummary,
    PricePoint, SectorSlice, TechnicalIndicators,
};
use crate::services::benchmark_service;
use crate::services::indicators;
use crate::services::returns::build_dated_returns;
use crate::services::risk_service::{self, WeightedSeries};
use crate::services::sector_service;
use crate::services::series_cache::{SeriesCache, SeriesKey};

/// Fetch a price series through the cache.
///
/// A fresh cached series short-circuits the provider; when the provider
/// fails, a stale cached series is served as a fallback before giving up.
pub async fn fetch_series_cached(
    provider: &dyn PriceProvider,
    cache: &SeriesCache,
    ticker: &str,
    period: Period,
    interval: Interval,
) -> Result<Vec<PricePoint>, AnalyticsError> {
    let key = SeriesKey::new(ticker, period, interval);

    if let Some(series) = cache.get_fresh(&key) {
        debug!(%ticker, "price series cache hit");
        return Ok(series);
    }

    match provider.fetch_history(ticker, period, interval).await {
        Ok(series) => {
            cache.insert(key, series.clone());
            Ok(series)
        }
        Err(e) => {
            if let Some(stale) = cache.get_any(&key) {
                warn!(%ticker, error = %e, "provider fetch failed, serving stale cached series");
                Ok(stale)
            } else {
                Err(AnalyticsError::data_unavailable(ticker, e))
            }
        }
    }
}

/// Fetch each holding's history and pair it with its current market value.
///
/// Holdings whose history cannot be fetched, or is too short to produce a
/// return, are excluded from the aggregate with a warning; the math layers
/// below decide whether what remains is enough.
async fn fetch_weighted_series(
    provider: &dyn PriceProvider,
    cache: &SeriesCache,
    config: &AnalyticsConfig,
    holdings: &[Holding],
) -> Vec<WeightedSeries> {
    let fetches = holdings.iter().map(|holding| async move {
        let series = fetch_series_cached(
            provider,
            cache,
            &holding.ticker,
            config.history_period,
            config.interval,
        )
        .await;
        (holding, series)
    });

    let mut legs = Vec::with_capacity(holdings.len());
    for (holding, result) in join_all(fetches).await {
        match result {
            Ok(series) if series.len() >= 2 => {
                if let Some(last) = series.last() {
                    legs.push(WeightedSeries {
                        ticker: holding.ticker.clone(),
                        value: holding.shares * last.close,
                        series,
                    });
                }
            }
            Ok(series) => warn!(
                ticker = %holding.ticker,
                points = series.len(),
                "series too short, excluding holding from aggregate"
            ),
            Err(e) => warn!(
                ticker = %holding.ticker,
                error = %e,
                "excluding holding without price history"
            ),
        }
    }
    legs
}

/// Risk/return metrics for a portfolio: Sharpe ratio, volatility, beta
/// against the configured benchmark, max drawdown and average return.
///
/// The benchmark being unreachable only nulls out beta; the other metrics
/// are still computed and returned.
pub async fn compute_analytics(
    provider: &dyn PriceProvider,
    cache: &SeriesCache,
    config: &AnalyticsConfig,
    holdings: &[Holding],
) -> Result<PortfolioMetrics, AnalyticsError> {
    if holdings.is_empty() {
        return Err(AnalyticsError::EmptyPortfolio);
    }

    info!(holdings = holdings.len(), "computing portfolio analytics");
    let legs = fetch_weighted_series(provider, cache, config, holdings).await;
    let weighted = risk_service::weighted_portfolio_returns(&legs)?;

    let benchmark_returns = match fetch_series_cached(
        provider,
        cache,
        &config.benchmark_ticker,
        config.history_period,
        config.interval,
    )
    .await
    {
        Ok(series) => match build_dated_returns(&series) {
            Ok(returns) => Some(returns),
            Err(e) => {
                warn!(benchmark = %config.benchmark_ticker, error = %e, "benchmark series unusable, beta will be null");
                None
            }
        },
        Err(e) => {
            warn!(benchmark = %config.benchmark_ticker, error = %e, "benchmark unavailable, beta will be null");
            None
        }
    };

    risk_service::portfolio_metrics(
        &weighted,
        benchmark_returns.as_deref(),
        config.risk_free_rate,
        config.interval,
    )
}

/// Compare the portfolio's value-weighted performance against a benchmark
/// ticker over the configured window.
///
/// Unlike beta inside [`compute_analytics`], a missing benchmark here is a
/// hard error: the comparison is the whole point of the call.
pub async fn compute_benchmark(
    provider: &dyn PriceProvider,
    cache: &SeriesCache,
    config: &AnalyticsConfig,
    holdings: &[Holding],
    benchmark_ticker: &str,
) -> Result<BenchmarkComparison, AnalyticsError> {
    if holdings.is_empty() {
        return Err(AnalyticsError::EmptyPortfolio);
    }

    info!(holdings = holdings.len(), benchmark = benchmark_ticker, "computing benchmark comparison");
    let legs = fetch_weighted_series(provider, cache, config, holdings).await;
    let index = benchmark_service::portfolio_index_series(&legs)?;

    let bench_series = fetch_series_cached(
        provider,
        cache,
        benchmark_ticker,
        config.history_period,
        config.interval,
    )
    .await
    .map_err(|e| AnalyticsError::BenchmarkUnavailable(e.to_string()))?;

    benchmark_service::compare(&index, &bench_series, benchmark_ticker, config.interval)
}

/// Technical indicator snapshot (moving averages, RSI, MACD) for one ticker.
pub async fn compute_indicators(
    provider: &dyn PriceProvider,
    cache: &SeriesCache,
    config: &AnalyticsConfig,
    ticker: &str,
    period: Period,
) -> Result<TechnicalIndicators, AnalyticsError> {
    let series = fetch_series_cached(provider, cache, ticker, period, config.interval).await?;
    if series.is_empty() {
        return Err(AnalyticsError::data_unavailable(
            ticker,
            "provider returned an empty series",
        ));
    }
    Ok(indicators::compute_snapshot(ticker, &series))
}

/// Mark every holding to market and derive portfolio totals.
///
/// A holding whose quote cannot be fetched fails the valuation; a missing
/// price is not the same as a price of zero.
pub async fn valuate_portfolio(
    provider: &dyn PriceProvider,
    holdings: &[Holding],
) -> Result<PortfolioSummary, AnalyticsError> {
    let quotes = join_all(holdings.iter().map(|holding| async move {
        provider
            .fetch_current_price(&holding.ticker)
            .await
            .map(|price| holding.valuate(price))
            .map_err(|e| AnalyticsError::data_unavailable(&holding.ticker, e))
    }))
    .await;

    let valuations = quotes.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(PortfolioSummary::from_valuations(valuations))
}

/// Sector allocation of the portfolio at current market prices.
pub async fn compute_sector_allocation(
    provider: &dyn PriceProvider,
    sectors: &dyn SectorLookup,
    holdings: &[Holding],
) -> Result<BTreeMap<String, SectorSlice>, AnalyticsError> {
    if holdings.is_empty() {
        return Err(AnalyticsError::EmptyPortfolio);
    }

    let summary = valuate_portfolio(provider, holdings).await?;
    sector_service::sector_allocation(&summary.holdings, sectors)
}
