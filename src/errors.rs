use thiserror::Error;

/// Error taxonomy for the analytics core.
///
/// Metrics that are merely degenerate (zero variance, empty overlap) do not
/// produce errors; the affected field is reported as `None` instead so that a
/// partial result can still be rendered. Errors are reserved for inputs that
/// make the whole computation meaningless.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("invalid price: {0}")]
    InvalidPrice(String),

    #[error("unsupported interval: {0}")]
    UnsupportedInterval(String),

    #[error("benchmark unavailable: {0}")]
    BenchmarkUnavailable(String),

    #[error("data unavailable for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    #[error("portfolio has no market value")]
    EmptyPortfolio,
}

impl AnalyticsError {
    pub fn data_unavailable(ticker: &str, reason: impl ToString) -> Self {
        AnalyticsError::DataUnavailable {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        }
    }
}
