use crate::models::{
    MacdIndicator, MacdTrend, MovingAverages, PricePoint, RsiIndicator, RsiSignal,
    TechnicalIndicators,
};

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;

/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // Running sum via scan, dropping the value that falls out of the window.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let out = if i + 1 >= window {
                Some(*sum / window as f64)
            } else {
                None
            };

            Some(out)
        })
        .collect()
}

/// Mean of the last `window` values; `None` when the series is shorter.
pub fn latest_sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    Some(values[values.len() - window..].iter().sum::<f64>() / window as f64)
}

/// Exponential Moving Average (EMA)
///
/// Seeded with the simple average of the first `period` values, then
/// `EMA_t = value_t * k + EMA_{t-1} * (1 - k)` with `k = 2 / (period + 1)`.
/// `None` until the seed window is filled.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = vec![None; values.len()];

    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(current);

    for i in period..values.len() {
        current = values[i] * k + (1.0 - k) * current;
        out[i] = Some(current);
    }

    out
}

/// EMA of the whole slice, seeding from however many values are available
/// (up to `period`). Used for the MACD signal line, which must be defined
/// as soon as the MACD line is.
fn ema_last_adaptive(values: &[f64], period: usize) -> Option<f64> {
    if values.is_empty() || period == 0 {
        return None;
    }

    let seed_len = period.min(values.len());
    let k = 2.0 / (period as f64 + 1.0);

    let mut current = values[..seed_len].iter().sum::<f64>() / seed_len as f64;
    for &v in &values[seed_len..] {
        current = v * k + (1.0 - k) * current;
    }

    Some(current)
}

/// Relative Strength Index, latest value, using Wilder's smoothing.
///
/// Bounded [0, 100]; a window with no losses reads 100. `None` when fewer
/// than `period + 1` prices exist.
pub fn rsi(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period]
        .iter()
        .map(|&c| if c > 0.0 { c } else { 0.0 })
        .sum::<f64>()
        / period as f64;
    let mut avg_loss = changes[..period]
        .iter()
        .map(|&c| if c < 0.0 { -c } else { 0.0 })
        .sum::<f64>()
        / period as f64;

    // Wilder smoothing: avg_t = (avg_{t-1} * (n - 1) + current) / n
    for &change in &changes[period..] {
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
        avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

fn classify_rsi(value: f64) -> RsiSignal {
    if value > RSI_OVERBOUGHT {
        RsiSignal::Overbought
    } else if value < RSI_OVERSOLD {
        RsiSignal::Oversold
    } else {
        RsiSignal::Neutral
    }
}

/// MACD snapshot: 12/26 EMA difference, 9-period signal line, histogram and
/// trend classification. All fields `None` when fewer than 26 prices exist.
pub fn macd(prices: &[f64]) -> MacdIndicator {
    let empty = MacdIndicator {
        macd: None,
        signal: None,
        histogram: None,
        trend: None,
    };

    if prices.len() < MACD_SLOW {
        return empty;
    }

    let fast = ema(prices, MACD_FAST);
    let slow = ema(prices, MACD_SLOW);

    let macd_values: Vec<f64> = fast
        .iter()
        .zip(slow.iter())
        .filter_map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let (macd_last, signal_last) = match (
        macd_values.last().copied(),
        ema_last_adaptive(&macd_values, MACD_SIGNAL),
    ) {
        (Some(m), Some(s)) => (m, s),
        _ => return empty,
    };

    let histogram = macd_last - signal_last;
    let trend = if histogram > 0.0 {
        MacdTrend::Bullish
    } else if histogram < 0.0 {
        MacdTrend::Bearish
    } else {
        MacdTrend::Neutral
    };

    MacdIndicator {
        macd: Some(macd_last),
        signal: Some(signal_last),
        histogram: Some(histogram),
        trend: Some(trend),
    }
}

/// Compute the full indicator snapshot for one instrument's price series.
pub fn compute_snapshot(ticker: &str, series: &[PricePoint]) -> TechnicalIndicators {
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();

    let rsi_value = rsi(&closes, RSI_PERIOD);

    TechnicalIndicators {
        ticker: ticker.to_string(),
        moving_averages: MovingAverages {
            ma_20: latest_sma(&closes, 20),
            ma_50: latest_sma(&closes, 50),
            ma_200: latest_sma(&closes, 200),
        },
        rsi: RsiIndicator {
            value: rsi_value,
            signal: rsi_value.map(classify_rsi),
        },
        macd: macd(&closes),
    }
}
