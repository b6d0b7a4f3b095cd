mod analytics;
mod portfolio;
mod price_point;

pub use analytics::{
    BenchmarkComparison, BenchmarkPerformance, MacdIndicator, MacdTrend, MovingAverages,
    PerformanceSummary, PortfolioMetrics, RsiIndicator, RsiSignal, SectorSlice,
    TechnicalIndicators,
};
pub use portfolio::{Holding, HoldingValuation, PortfolioSummary};
pub use price_point::{Interval, Period, PricePoint};
