// src/config.rs
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::chart::ChartConfig;
use crate::error::period_from_i64;
use crate::indicators::IndicatorParams;

const DEFAULT_CONFIG_FILE: &str = "stock_insight";
const CONFIG_PATH_VAR: &str = "STOCK_INSIGHT_CONFIG";
const ENV_PREFIX: &str = "STOCK_INSIGHT";

/// Indicator settings as written in config files. Kept signed so a negative
/// window is reported as an invalid parameter rather than a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorSettings {
    pub ma_window: i64,
    pub rsi_window: i64,
    pub macd_fast: i64,
    pub macd_slow: i64,
    pub macd_signal: i64,
}

impl IndicatorSettings {
    pub fn to_params(&self) -> Result<IndicatorParams> {
        Ok(IndicatorParams {
            ma_window: period_from_i64("ma_window", self.ma_window)?,
            rsi_window: period_from_i64("rsi_window", self.rsi_window)?,
            macd_fast: period_from_i64("macd_fast", self.macd_fast)?,
            macd_slow: period_from_i64("macd_slow", self.macd_slow)?,
            macd_signal: period_from_i64("macd_signal", self.macd_signal)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub interval: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            interval: "1d".to_string(),
            timeout_secs: 30,
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub indicators: IndicatorSettings,
    pub provider: ProviderConfig,
    pub chart: ChartConfig,
}

impl AppConfig {
    /// Loads defaults, then the optional config file, then `STOCK_INSIGHT__*`
    /// environment variables (e.g. `STOCK_INSIGHT__INDICATORS__RSI_WINDOW=21`).
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from(Some(file), true)
    }

    /// Loads configuration from an explicit file, optionally layering the
    /// environment on top.
    pub fn load_from(file: Option<PathBuf>, with_env: bool) -> Result<Self> {
        let params = IndicatorParams::default();
        let provider = ProviderConfig::default();
        let chart = ChartConfig::default();

        let mut builder = Config::builder()
            .set_default("indicators.ma_window", params.ma_window as i64)?
            .set_default("indicators.rsi_window", params.rsi_window as i64)?
            .set_default("indicators.macd_fast", params.macd_fast as i64)?
            .set_default("indicators.macd_slow", params.macd_slow as i64)?
            .set_default("indicators.macd_signal", params.macd_signal as i64)?
            .set_default("provider.base_url", provider.base_url)?
            .set_default("provider.interval", provider.interval)?
            .set_default("provider.timeout_secs", provider.timeout_secs)?
            .set_default("provider.user_agent", provider.user_agent)?
            .set_default("chart.width", chart.width)?
            .set_default("chart.height", chart.height)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_file() {
        let config = AppConfig::load_from(None, false).unwrap();
        assert_eq!(config.indicators.to_params().unwrap(), IndicatorParams::default());
        assert_eq!(config.provider.interval, "1d");
        assert_eq!((config.chart.width, config.chart.height), (1400, 1000));
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[indicators]\nrsi_window = 21\n\n[provider]\ninterval = \"1wk\"\n\n[chart]\nwidth = 800"
        )
        .unwrap();

        let config = AppConfig::load_from(Some(file.path().to_path_buf()), false).unwrap();
        let params = config.indicators.to_params().unwrap();
        assert_eq!(params.rsi_window, 21);
        assert_eq!(params.ma_window, 5);
        assert_eq!(config.provider.interval, "1wk");
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.height, 1000);
    }

    #[test]
    fn negative_window_is_an_invalid_parameter() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[indicators]\nma_window = -3").unwrap();

        let config = AppConfig::load_from(Some(file.path().to_path_buf()), false).unwrap();
        let err = config.indicators.to_params().unwrap_err();
        assert!(err.to_string().contains("ma_window"));
    }
}
