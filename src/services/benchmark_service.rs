use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::errors::AnalyticsError;
use crate::models::{
    BenchmarkComparison, BenchmarkPerformance, Interval, PerformanceSummary, PricePoint,
};
use crate::services::returns::build_returns;
use crate::services::risk_service::{volatility, WeightedSeries};

/// Collapse per-holding price series into a single portfolio index level
/// series, weighted by each holding's share of current portfolio value.
///
/// Each holding's series is normalized to 1.0 at the first date common to
/// all holdings, so the index starts at 1.0 and moves with the
/// value-weighted sum of the normalized prices. Only common dates are kept.
pub fn portfolio_index_series(
    legs: &[WeightedSeries],
) -> Result<Vec<PricePoint>, AnalyticsError> {
    if legs.is_empty() {
        return Err(AnalyticsError::InsufficientData(
            "no price history for any holding".to_string(),
        ));
    }

    let total_value: f64 = legs.iter().map(|l| l.value).sum();
    if total_value <= 0.0 {
        return Err(AnalyticsError::EmptyPortfolio);
    }

    let mut maps: Vec<BTreeMap<NaiveDate, f64>> = Vec::with_capacity(legs.len());
    for leg in legs {
        if let Some(p) = leg.series.iter().find(|p| p.close <= 0.0) {
            return Err(AnalyticsError::InvalidPrice(format!(
                "{}: non-positive close {} on {}",
                leg.ticker, p.close, p.date
            )));
        }
        maps.push(leg.series.iter().map(|p| (p.date, p.close)).collect());
    }

    let mut common: Vec<NaiveDate> = maps[0].keys().copied().collect();
    for map in &maps[1..] {
        common.retain(|d| map.contains_key(d));
    }
    if common.len() < 2 {
        return Err(AnalyticsError::InsufficientData(format!(
            "holdings share only {} common dates, need at least 2",
            common.len()
        )));
    }

    let first = common[0];
    let index = common
        .iter()
        .map(|date| {
            let level = legs
                .iter()
                .zip(&maps)
                .map(|(leg, map)| leg.value / total_value * (map[date] / map[&first]))
                .sum();
            PricePoint::new(*date, level)
        })
        .collect();

    debug!(points = common.len(), legs = legs.len(), "built portfolio index series");
    Ok(index)
}

/// Total return, annualized return and volatility over one price series.
fn performance_summary(
    series: &[PricePoint],
    interval: Interval,
) -> Result<PerformanceSummary, AnalyticsError> {
    let (first, last) = match (series.first(), series.last()) {
        (Some(f), Some(l)) if series.len() >= 2 => (f, l),
        _ => {
            return Err(AnalyticsError::InsufficientData(format!(
                "need at least 2 prices for a performance summary, got {}",
                series.len()
            )))
        }
    };

    let returns = build_returns(series)?;
    let total_return = (last.close / first.close - 1.0) * 100.0;

    let days = (last.date - first.date).num_days().max(1) as f64;
    let annualized_return =
        ((1.0 + total_return / 100.0).powf(365.0 / days) - 1.0) * 100.0;

    Ok(PerformanceSummary {
        total_return,
        annualized_return,
        volatility: volatility(&returns, interval)?,
    })
}

/// Compare the portfolio index against a benchmark over the same window.
///
/// An unusable benchmark series (unfetchable, or fewer than 2 points) is a
/// hard [`AnalyticsError::BenchmarkUnavailable`] error; it is never silently
/// replaced by a default.
pub fn compare(
    portfolio_index: &[PricePoint],
    benchmark_series: &[PricePoint],
    benchmark_ticker: &str,
    interval: Interval,
) -> Result<BenchmarkComparison, AnalyticsError> {
    if benchmark_series.len() < 2 {
        return Err(AnalyticsError::BenchmarkUnavailable(format!(
            "{benchmark_ticker} returned {} points, need at least 2",
            benchmark_series.len()
        )));
    }

    let portfolio = performance_summary(portfolio_index, interval)?;
    let bench = performance_summary(benchmark_series, interval).map_err(|e| {
        AnalyticsError::BenchmarkUnavailable(format!("{benchmark_ticker}: {e}"))
    })?;

    Ok(BenchmarkComparison {
        alpha: portfolio.annualized_return - bench.annualized_return,
        outperformance: portfolio.total_return - bench.total_return,
        portfolio,
        benchmark: BenchmarkPerformance {
            ticker: benchmark_ticker.to_string(),
            summary: bench,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pp(date: &str, close: f64) -> PricePoint {
        PricePoint::new(date.parse().unwrap(), close)
    }

    fn leg(ticker: &str, value: f64, series: Vec<PricePoint>) -> WeightedSeries {
        WeightedSeries {
            ticker: ticker.into(),
            value,
            series,
        }
    }

    #[test]
    fn test_single_leg_index_is_normalized_prices() {
        let series = vec![
            pp("2024-01-01", 50.0),
            pp("2024-01-02", 55.0),
            pp("2024-01-03", 60.0),
        ];
        let index = portfolio_index_series(&[leg("A", 1000.0, series)]).unwrap();
        assert_eq!(index.len(), 3);
        assert!((index[0].close - 1.0).abs() < 1e-12);
        assert!((index[1].close - 1.1).abs() < 1e-12);
        assert!((index[2].close - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_equal_weight_index_averages_normalized_moves() {
        let up = vec![pp("2024-01-01", 100.0), pp("2024-01-02", 120.0)];
        let down = vec![pp("2024-01-01", 10.0), pp("2024-01-02", 9.0)];
        let index =
            portfolio_index_series(&[leg("UP", 500.0, up), leg("DOWN", 500.0, down)]).unwrap();
        // 0.5 * 1.2 + 0.5 * 0.9 = 1.05
        assert!((index[1].close - 1.05).abs() < 1e-12);
    }

    #[test]
    fn test_index_requires_common_dates() {
        let a = vec![pp("2024-01-01", 100.0), pp("2024-01-02", 101.0)];
        let b = vec![pp("2024-02-01", 50.0), pp("2024-02-02", 51.0)];
        let err =
            portfolio_index_series(&[leg("A", 100.0, a), leg("B", 100.0, b)]).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
    }

    #[test]
    fn test_year_long_total_return_matches_annualized() {
        // Exactly 365 days between endpoints, so annualized == total.
        let series = vec![
            pp("2024-01-01", 100.0),
            pp("2024-06-01", 104.0),
            pp("2024-12-31", 110.0),
        ];
        let summary = performance_summary(&series, Interval::Daily).unwrap();
        assert!((summary.total_return - 10.0).abs() < 1e-9);
        assert!((summary.annualized_return - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_series_has_zero_alpha() {
        let series = vec![
            pp("2024-01-01", 100.0),
            pp("2024-01-02", 102.0),
            pp("2024-01-03", 99.0),
            pp("2024-01-04", 105.0),
        ];
        let cmp = compare(&series, &series, "SPY", Interval::Daily).unwrap();
        assert!(cmp.alpha.abs() < 1e-9);
        assert!(cmp.outperformance.abs() < 1e-9);
        assert_eq!(cmp.benchmark.ticker, "SPY");
    }

    #[test]
    fn test_short_benchmark_is_unavailable() {
        let portfolio = vec![
            pp("2024-01-01", 1.0),
            pp("2024-01-02", 1.01),
            pp("2024-01-03", 1.02),
        ];
        let bench = vec![pp("2024-01-01", 400.0)];
        let err = compare(&portfolio, &bench, "SPY", Interval::Daily).unwrap_err();
        assert!(matches!(err, AnalyticsError::BenchmarkUnavailable(_)));
    }

    #[test]
    fn test_outperformance_is_total_return_difference() {
        let portfolio = vec![
            pp("2024-01-01", 1.0),
            pp("2024-01-02", 1.05),
            pp("2024-01-03", 1.2),
        ];
        let bench = vec![
            pp("2024-01-01", 100.0),
            pp("2024-01-02", 101.0),
            pp("2024-01-03", 110.0),
        ];
        let cmp = compare(&portfolio, &bench, "SPY", Interval::Daily).unwrap();
        assert!((cmp.outperformance - (20.0 - 10.0)).abs() < 1e-9);
    }
}
