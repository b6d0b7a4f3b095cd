use serde::{Deserialize, Serialize};

/// Risk/return metrics for a portfolio.
///
/// All percentage values are expressed in percent (e.g., 10.5 for 10.5%).
/// `None` always means "not computable from the supplied data" and is never
/// used in place of a legitimate zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Annualized Sharpe ratio; `None` when the return series has no variance
    pub sharpe_ratio: Option<f64>,

    /// Annualized volatility (sample standard deviation of returns), as a percentage
    pub volatility: f64,

    /// Beta relative to the benchmark; `None` when the benchmark series is
    /// missing, too short, or has zero variance
    pub beta: Option<f64>,

    /// Maximum peak-to-trough decline, as a negative-or-zero percentage
    pub max_drawdown: f64,

    /// Mean per-period return, as a percentage
    pub average_return: f64,
}

/// Return profile of one side of a benchmark comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// (last / first - 1) over the window, as a percentage
    pub total_return: f64,
    /// Total return extrapolated to a 365-day year, as a percentage
    pub annualized_return: f64,
    /// Annualized volatility over the window, as a percentage
    pub volatility: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkPerformance {
    pub ticker: String,
    #[serde(flatten)]
    pub summary: PerformanceSummary,
}

/// Portfolio performance measured against a benchmark ticker over the same
/// date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub portfolio: PerformanceSummary,
    pub benchmark: BenchmarkPerformance,
    /// Difference in annualized return, portfolio minus benchmark
    pub alpha: f64,
    /// Difference in total return, portfolio minus benchmark
    pub outperformance: f64,
}

/// Value and share of the portfolio held in one sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSlice {
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdTrend {
    Bullish,
    Bearish,
    Neutral,
}

/// Latest simple moving averages; each `None` when the series is shorter
/// than the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverages {
    pub ma_20: Option<f64>,
    pub ma_50: Option<f64>,
    pub ma_200: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiIndicator {
    pub value: Option<f64>,
    pub signal: Option<RsiSignal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
    pub trend: Option<MacdTrend>,
}

/// Technical indicator snapshot for a single instrument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub ticker: String,
    pub moving_averages: MovingAverages,
    pub rsi: RsiIndicator,
    pub macd: MacdIndicator,
}
