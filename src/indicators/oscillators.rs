use tracing::debug;

use crate::error::{validate_period, Result};
use crate::indicators::ta::{MovingAverageConvergenceDivergence, Next, RelativeStrengthIndex};
use crate::models::Series;

/// Adds an `rsi` column computed from simple averages of the last `window`
/// close-to-close changes.
///
/// The first `window` bars have no value. An all-gain window yields 100, a
/// window without any movement yields NaN.
pub fn calculate_rsi(series: &Series, window: usize) -> Result<Series> {
    let window = validate_period("window", window)?;
    let mut rsi = RelativeStrengthIndex::new(window)?;

    let values: Vec<Option<f64>> = series.closes().map(|close| rsi.next(close)).collect();

    let undefined = values.iter().filter(|v| matches!(v, Some(x) if x.is_nan())).count();
    if undefined > 0 {
        debug!("RSI (window {}) has {} flat windows with no value", window, undefined);
    }

    Ok(series.with_rsi(values))
}

/// Adds `macd_line` and `signal_line` columns.
///
/// Both EMAs are seeded with the first close, so the MACD line starts at 0
/// and every bar gets a value.
pub fn calculate_macd(
    series: &Series,
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<Series> {
    let mut macd = MovingAverageConvergenceDivergence::new(fast_period, slow_period, signal_period)?;

    let mut macd_line = Vec::with_capacity(series.len());
    let mut signal_line = Vec::with_capacity(series.len());

    for close in series.closes() {
        let out = macd.next(close);
        macd_line.push(Some(out.macd));
        signal_line.push(Some(out.signal));
    }

    if fast_period > slow_period {
        debug!(
            "MACD fast period {} is longer than slow period {}",
            fast_period, slow_period
        );
    }

    Ok(series.with_macd(macd_line, signal_line))
}
