use chrono::NaiveDate;

use crate::errors::AnalyticsError;
use crate::models::PricePoint;

/// Build the period-over-period simple return series for a price series.
///
/// `returns[i] = close[i+1] / close[i] - 1`, so the output is one element
/// shorter than the input. Pure and deterministic.
pub fn build_returns(series: &[PricePoint]) -> Result<Vec<f64>, AnalyticsError> {
    ensure_usable(series)?;

    Ok(series
        .windows(2)
        .map(|w| w[1].close / w[0].close - 1.0)
        .collect())
}

/// Same as [`build_returns`] but keeps the date of each return (the date of
/// the later of the two prices), for alignment across series.
pub fn build_dated_returns(
    series: &[PricePoint],
) -> Result<Vec<(NaiveDate, f64)>, AnalyticsError> {
    ensure_usable(series)?;

    Ok(series
        .windows(2)
        .map(|w| (w[1].date, w[1].close / w[0].close - 1.0))
        .collect())
}

fn ensure_usable(series: &[PricePoint]) -> Result<(), AnalyticsError> {
    if series.len() < 2 {
        return Err(AnalyticsError::InsufficientData(format!(
            "need at least 2 prices to build returns, got {}",
            series.len()
        )));
    }
    if let Some(p) = series.iter().find(|p| p.close <= 0.0) {
        return Err(AnalyticsError::InvalidPrice(format!(
            "non-positive close {} on {}",
            p.close, p.date
        )));
    }
    Ok(())
}

/// Arithmetic mean. Callers guarantee a non-empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
///
/// `None` with fewer than two observations, where the statistic is undefined.
pub(crate) fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        / (values.len() as f64 - 1.0);
    Some(variance.sqrt())
}

/// Restrict two dated return series to their overlapping dates.
///
/// Both inputs are ascending by date; the result pairs values date-for-date
/// with a single merge pass.
pub(crate) fn align_by_date(
    a: &[(NaiveDate, f64)],
    b: &[(NaiveDate, f64)],
) -> (Vec<f64>, Vec<f64>) {
    let mut out_a = Vec::new();
    let mut out_b = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Equal => {
                out_a.push(a[i].1);
                out_b.push(b[j].1);
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }

    (out_a, out_b)
}
