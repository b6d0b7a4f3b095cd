use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Interval, Period, PricePoint};

#[derive(Debug, Error)]
pub enum PriceProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unknown ticker: {0}")]
    UnknownTicker(String),

    #[error("rate limited")]
    RateLimited,
}

/// External source of historical closes and current quotes.
///
/// Implementations own all network concerns (retries, timeouts, rate limits);
/// the analytics core only consumes the ordered series they return. Series
/// must be ascending by date with no duplicate dates.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_history(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Vec<PricePoint>, PriceProviderError>;

    async fn fetch_current_price(&self, ticker: &str) -> Result<f64, PriceProviderError>;
}

/// Ticker-to-sector metadata lookup.
///
/// Sector names are free-form strings owned by the lookup source, not a
/// closed enum. A miss maps to "Unknown"; the lookup never fails.
pub trait SectorLookup: Send + Sync {
    fn sector(&self, ticker: &str) -> String;
}

pub const UNKNOWN_SECTOR: &str = "Unknown";

impl SectorLookup for HashMap<String, String> {
    fn sector(&self, ticker: &str) -> String {
        self.get(ticker)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_SECTOR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_lookup_falls_back_to_unknown() {
        let mut map = HashMap::new();
        map.insert("AAPL".to_string(), "Technology".to_string());

        assert_eq!(map.sector("AAPL"), "Technology");
        assert_eq!(map.sector("ZZZZ"), "Unknown");
    }
}
