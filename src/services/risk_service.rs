use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::AnalyticsError;
use crate::models::{Interval, PortfolioMetrics, PricePoint};
use crate::services::returns::{align_by_date, build_dated_returns, mean, sample_std};

/// One holding's price history together with its current market value,
/// which fixes its weight in the portfolio aggregate.
#[derive(Debug, Clone)]
pub struct WeightedSeries {
    pub ticker: String,
    pub value: f64,
    pub series: Vec<PricePoint>,
}

/// Mean per-period return, as a percentage.
pub fn average_return(returns: &[f64]) -> Result<f64, AnalyticsError> {
    if returns.is_empty() {
        return Err(AnalyticsError::InsufficientData(
            "cannot average an empty return series".to_string(),
        ));
    }
    Ok(mean(returns) * 100.0)
}

/// Annualized volatility as a percentage: sample standard deviation of the
/// per-period returns scaled by the square root of periods per year.
pub fn volatility(returns: &[f64], interval: Interval) -> Result<f64, AnalyticsError> {
    let std = sample_std(returns).ok_or_else(|| {
        AnalyticsError::InsufficientData(format!(
            "need at least 2 returns for volatility, got {}",
            returns.len()
        ))
    })?;
    Ok(std * interval.periods_per_year().sqrt() * 100.0)
}

/// Convert an annual risk-free rate to the rate for one sampling period.
pub fn per_period_risk_free(annual_rate: f64, interval: Interval) -> f64 {
    (1.0 + annual_rate).powf(1.0 / interval.periods_per_year()) - 1.0
}

/// Annualized Sharpe ratio.
///
/// `None` when the return series has no variance (a flat series has an
/// undefined risk-adjusted return), or fewer than two observations.
pub fn sharpe_ratio(returns: &[f64], annual_risk_free: f64, interval: Interval) -> Option<f64> {
    let std = sample_std(returns)?;
    if std == 0.0 {
        debug!("zero-variance return series, sharpe ratio undefined");
        return None;
    }
    let excess = mean(returns) - per_period_risk_free(annual_risk_free, interval);
    Some(excess / std * interval.periods_per_year().sqrt())
}

/// Beta of the portfolio relative to a benchmark: covariance over benchmark
/// variance, computed on the date-aligned overlap of the two return series.
///
/// `None` when fewer than two dates overlap or the benchmark has zero
/// variance over the overlap.
pub fn beta(
    portfolio: &[(NaiveDate, f64)],
    benchmark: &[(NaiveDate, f64)],
) -> Option<f64> {
    let (port, bench) = align_by_date(portfolio, benchmark);
    if port.len() < 2 {
        debug!(overlap = port.len(), "not enough overlap for beta");
        return None;
    }

    let mean_p = mean(&port);
    let mean_b = mean(&bench);
    let n = port.len() as f64 - 1.0;

    let cov = port
        .iter()
        .zip(bench.iter())
        .map(|(p, b)| (p - mean_p) * (b - mean_b))
        .sum::<f64>()
        / n;
    let var_b = bench.iter().map(|b| (b - mean_b).powi(2)).sum::<f64>() / n;

    if var_b.abs() < f64::EPSILON {
        return None;
    }
    Some(cov / var_b)
}

/// Maximum drawdown of a price (or index level) series, as a
/// negative-or-zero percentage. Single pass tracking the running peak;
/// 0 for a monotonically non-declining series.
pub fn max_drawdown(prices: &[f64]) -> f64 {
    let mut peak = match prices.first() {
        Some(&p) => p,
        None => return 0.0,
    };
    let mut max_dd = 0.0_f64;

    for &price in prices {
        if price > peak {
            peak = price;
        }
        let dd = (price - peak) / peak;
        if dd < max_dd {
            max_dd = dd;
        }
    }

    max_dd * 100.0
}

/// Growth of 1.0 invested at the start of a return series; one element
/// longer than the input.
pub fn cumulative_index(returns: &[f64]) -> Vec<f64> {
    let mut level = 1.0;
    let mut index = Vec::with_capacity(returns.len() + 1);
    index.push(level);
    for r in returns {
        level *= 1.0 + r;
        index.push(level);
    }
    index
}

/// Aggregate per-holding returns into a single portfolio return series,
/// weighted by each holding's share of current portfolio value.
///
/// Only dates present in every holding's series are kept, so the result is
/// aligned across the whole portfolio.
pub fn weighted_portfolio_returns(
    legs: &[WeightedSeries],
) -> Result<Vec<(NaiveDate, f64)>, AnalyticsError> {
    if legs.is_empty() {
        return Err(AnalyticsError::InsufficientData(
            "no price history for any holding".to_string(),
        ));
    }

    let total_value: f64 = legs.iter().map(|l| l.value).sum();
    if total_value <= 0.0 {
        return Err(AnalyticsError::EmptyPortfolio);
    }

    let mut combined: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for leg in legs {
        let weight = leg.value / total_value;
        for (date, ret) in build_dated_returns(&leg.series)? {
            let entry = combined.entry(date).or_insert((0.0, 0));
            entry.0 += weight * ret;
            entry.1 += 1;
        }
    }

    let weighted: Vec<(NaiveDate, f64)> = combined
        .into_iter()
        .filter(|(_, (_, count))| *count == legs.len())
        .map(|(date, (ret, _))| (date, ret))
        .collect();

    if weighted.is_empty() {
        return Err(AnalyticsError::InsufficientData(
            "holdings have no overlapping price history".to_string(),
        ));
    }

    debug!(points = weighted.len(), legs = legs.len(), "built weighted return series");
    Ok(weighted)
}

/// Assemble the full risk/return metric set from a weighted portfolio return
/// series and an optional benchmark return series.
///
/// Degenerate sub-metrics come back as `None` inside an `Ok` result; the
/// whole computation fails only when the return series itself is unusable.
pub fn portfolio_metrics(
    weighted: &[(NaiveDate, f64)],
    benchmark: Option<&[(NaiveDate, f64)]>,
    risk_free_rate: f64,
    interval: Interval,
) -> Result<PortfolioMetrics, AnalyticsError> {
    let rets: Vec<f64> = weighted.iter().map(|(_, r)| *r).collect();

    Ok(PortfolioMetrics {
        average_return: average_return(&rets)?,
        volatility: volatility(&rets, interval)?,
        sharpe_ratio: sharpe_ratio(&rets, risk_free_rate, interval),
        beta: benchmark.and_then(|b| beta(weighted, b)),
        max_drawdown: max_drawdown(&cumulative_index(&rets)),
    })
}
