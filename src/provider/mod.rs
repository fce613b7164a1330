//! Market data sources.
//!
//! [`MarketDataProvider`] is the seam between the indicator pipeline and
//! wherever daily bars come from. The pipeline only ever sees a validated
//! [`Series`]; vendor quirks stay inside the implementation.

pub mod yahoo;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::IndicatorError;
use crate::models::Series;

pub use self::yahoo::YahooProvider;

/// Period strings accepted by the chart endpoint.
pub const SUPPORTED_PERIODS: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unsupported period `{0}` (expected one of: {})", SUPPORTED_PERIODS.join(", "))]
    InvalidPeriod(String),

    #[error("request to market data provider failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("market data provider returned an error: {code} - {description}")]
    Api { code: String, description: String },

    #[error("no data returned for `{0}`")]
    EmptyResponse(String),

    #[error("malformed price data: {0}")]
    Series(#[from] IndicatorError),
}

/// Fetches a daily price series for one ticker.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_series(&self, ticker: &str, period: &str) -> Result<Series, ProviderError>;
}

/// Checks a period string against [`SUPPORTED_PERIODS`], ignoring surrounding
/// whitespace and case.
pub fn normalize_period(period: &str) -> Result<String, ProviderError> {
    let normalized = period.trim().to_lowercase();
    if SUPPORTED_PERIODS.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(ProviderError::InvalidPeriod(period.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_periods_are_accepted() {
        assert_eq!(normalize_period("1mo").unwrap(), "1mo");
        assert_eq!(normalize_period(" 6MO ").unwrap(), "6mo");
        assert_eq!(normalize_period("max").unwrap(), "max");
    }

    #[test]
    fn unknown_periods_are_rejected() {
        let err = normalize_period("one month").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidPeriod(ref p) if p == "one month"));
        assert!(err.to_string().contains("1mo"));
    }
}
