use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::AnalyticsError;
use crate::external::SectorLookup;
use crate::models::{HoldingValuation, SectorSlice};

/// Group marked-to-market holdings by sector and compute each sector's value
/// and share of total portfolio value.
///
/// Tickers the lookup does not know land in the "Unknown" sector. A
/// portfolio with zero total value is an [`AnalyticsError::EmptyPortfolio`]
/// error rather than an empty map, so callers cannot mistake "nothing to
/// allocate" for "everything allocated to nothing".
pub fn sector_allocation(
    holdings: &[HoldingValuation],
    sectors: &dyn SectorLookup,
) -> Result<BTreeMap<String, SectorSlice>, AnalyticsError> {
    let total_value: f64 = holdings.iter().map(|h| h.current_value).sum();
    if total_value <= 0.0 {
        return Err(AnalyticsError::EmptyPortfolio);
    }

    let mut by_sector: BTreeMap<String, f64> = BTreeMap::new();
    for holding in holdings {
        *by_sector.entry(sectors.sector(&holding.ticker)).or_insert(0.0) +=
            holding.current_value;
    }

    debug!(sectors = by_sector.len(), "computed sector allocation");

    Ok(by_sector
        .into_iter()
        .map(|(sector, value)| {
            (
                sector,
                SectorSlice {
                    value,
                    percentage: value / total_value * 100.0,
                },
            )
        })
        .collect())
}
