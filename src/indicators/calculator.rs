use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{validate_period, Result};
use crate::indicators::oscillators::{calculate_macd, calculate_rsi};
use crate::indicators::overlaps::moving_average;
use crate::models::Series;

/// Window and period settings for every indicator the calculator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub ma_window: usize,
    pub rsi_window: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ma_window: 5,
            rsi_window: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

impl IndicatorParams {
    /// Rejects any non-positive setting before a single bar is processed.
    pub fn validate(&self) -> Result<()> {
        validate_period("ma_window", self.ma_window)?;
        validate_period("rsi_window", self.rsi_window)?;
        validate_period("macd_fast", self.macd_fast)?;
        validate_period("macd_slow", self.macd_slow)?;
        validate_period("macd_signal", self.macd_signal)?;
        Ok(())
    }
}

pub struct IndicatorCalculator;

impl IndicatorCalculator {
    /// Applies moving average, RSI and MACD to `series` and returns the
    /// augmented copy. The input series is not modified.
    #[instrument(skip(series), fields(bars = series.len()))]
    pub fn apply_all(series: &Series, params: &IndicatorParams) -> Result<Series> {
        params.validate()?;

        let series = moving_average(series, params.ma_window)?;
        info!("Calculated moving average (window {})", params.ma_window);

        let series = calculate_rsi(&series, params.rsi_window)?;
        info!("Calculated RSI (window {})", params.rsi_window);

        let series = calculate_macd(&series, params.macd_fast, params.macd_slow, params.macd_signal)?;
        info!(
            "Calculated MACD ({}/{}/{})",
            params.macd_fast, params.macd_slow, params.macd_signal
        );

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndicatorError;
    use crate::indicators::test_support::{assert_same_columns, series_of};

    #[test]
    fn defaults_match_the_classic_settings() {
        let params = IndicatorParams::default();
        assert_eq!(params.ma_window, 5);
        assert_eq!(params.rsi_window, 14);
        assert_eq!((params.macd_fast, params.macd_slow, params.macd_signal), (12, 26, 9));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn apply_all_sets_every_column() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let series = series_of(&closes);
        let out = IndicatorCalculator::apply_all(&series, &IndicatorParams::default()).unwrap();

        assert_eq!(out.moving_average().unwrap().len(), 40);
        assert_eq!(out.rsi().unwrap().len(), 40);
        assert_eq!(out.macd_line().unwrap().len(), 40);
        assert_eq!(out.signal_line().unwrap().len(), 40);
        assert!(out.macd_histogram().is_some());
        assert!(series.rsi().is_none());
    }

    #[test]
    fn invalid_params_fail_without_output() {
        let series = series_of(&[1.0, 2.0, 3.0]);
        let params = IndicatorParams {
            macd_signal: 0,
            ..IndicatorParams::default()
        };
        assert_eq!(
            IndicatorCalculator::apply_all(&series, &params).unwrap_err(),
            IndicatorError::InvalidParameter { name: "macd_signal", value: 0 }
        );
    }

    #[test]
    fn order_of_application_does_not_matter() {
        let closes = [10.0, 10.5, 10.5, 9.75, 11.0, 12.5, 12.0, 12.0, 13.25, 12.75];
        let series = series_of(&closes);

        let a = IndicatorCalculator::apply_all(
            &series,
            &IndicatorParams {
                ma_window: 3,
                rsi_window: 3,
                macd_fast: 2,
                macd_slow: 4,
                macd_signal: 3,
            },
        )
        .unwrap();

        let b = calculate_macd(&series, 2, 4, 3).unwrap();
        let b = calculate_rsi(&b, 3).unwrap();
        let b = moving_average(&b, 3).unwrap();

        assert_same_columns(&a, &b);
    }
}
