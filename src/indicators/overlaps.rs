use tracing::debug;

use crate::error::{validate_period, Result};
use crate::indicators::ta::{Next, SimpleMovingAverage};
use crate::models::Series;

/// Adds a `moving_average` column: the mean of the last `window_size` closes,
/// undefined for the first `window_size - 1` bars.
pub fn moving_average(series: &Series, window_size: usize) -> Result<Series> {
    let window_size = validate_period("window_size", window_size)?;
    let mut sma = SimpleMovingAverage::new(window_size)?;

    let values: Vec<Option<f64>> = series.closes().map(|close| sma.next(close)).collect();

    debug!(
        "Moving average (window {}) defined for {} of {} bars",
        window_size,
        values.iter().filter(|v| v.is_some()).count(),
        values.len()
    );

    Ok(series.with_moving_average(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndicatorError;
    use crate::indicators::test_support::series_of;

    #[test]
    fn rising_closes_window_three() {
        let series = series_of(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let out = moving_average(&series, 3).unwrap();
        assert_eq!(
            out.moving_average().unwrap(),
            &[None, None, Some(11.0), Some(12.0), Some(13.0), Some(14.0)]
        );
    }

    #[test]
    fn defined_iff_enough_history() {
        let closes = [3.5, 1.25, 8.0, 2.0, 9.75, 4.5, 6.0];
        let series = series_of(&closes);

        for window in 1..=closes.len() {
            let out = moving_average(&series, window).unwrap();
            let ma = out.moving_average().unwrap();
            for (i, value) in ma.iter().enumerate() {
                if i + 1 >= window {
                    let expected = closes[i + 1 - window..=i].iter().sum::<f64>() / window as f64;
                    assert_eq!(*value, Some(expected), "window {} index {}", window, i);
                } else {
                    assert_eq!(*value, None, "window {} index {}", window, i);
                }
            }
        }
    }

    #[test]
    fn window_longer_than_series_is_all_undefined() {
        let series = series_of(&[1.0, 2.0]);
        let out = moving_average(&series, 5).unwrap();
        assert_eq!(out.moving_average().unwrap(), &[None, None]);
    }

    #[test]
    fn constant_closes_average_to_the_constant() {
        let series = series_of(&[10.0; 10]);
        let out = moving_average(&series, 4).unwrap();
        let ma = out.moving_average().unwrap();
        assert!(ma[..3].iter().all(Option::is_none));
        assert!(ma[3..].iter().all(|v| *v == Some(10.0)));
    }

    #[test]
    fn zero_window_fails_before_computing() {
        let series = series_of(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            moving_average(&series, 0),
            Err(IndicatorError::InvalidParameter { name: "window_size", value: 0 })
        ));
    }

    #[test]
    fn original_fields_are_untouched() {
        let series = series_of(&[1.0, 2.0, 3.0]);
        let out = moving_average(&series, 2).unwrap();
        assert_eq!(out.bars(), series.bars());
        assert!(series.moving_average().is_none());
    }
}
