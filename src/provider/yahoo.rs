use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::models::{RawBar, Series};
use crate::provider::{normalize_period, MarketDataProvider, ProviderError};

// Yahoo Finance chart API response structures

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Daily bars from the Yahoo Finance chart endpoint.
pub struct YahooProvider {
    client: Client,
    base_url: String,
    interval: String,
}

impl YahooProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            interval: config.interval.clone(),
        })
    }

    fn chart_url(&self, ticker: &str, period: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url, ticker, period, self.interval
        )
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn fetch_series(&self, ticker: &str, period: &str) -> Result<Series, ProviderError> {
        let period = normalize_period(period)?;
        let url = self.chart_url(ticker, &period);

        info!("Fetching {} ({}) from {}", ticker, period, url);

        let response: ChartResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await?;

        let series = parse_chart(ticker, response)?;
        info!("Fetched {} bars for {}", series.len(), ticker);

        Ok(series)
    }
}

/// Turns a decoded chart response into a validated series.
pub(crate) fn parse_chart(ticker: &str, response: ChartResponse) -> Result<Series, ProviderError> {
    if let Some(error) = response.chart.error {
        return Err(ProviderError::Api {
            code: error.code,
            description: error.description,
        });
    }

    let data = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProviderError::EmptyResponse(ticker.to_string()))?;

    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    if quote.close.len() != data.timestamp.len() {
        warn!(
            "{}: {} timestamps but {} closes",
            ticker,
            data.timestamp.len(),
            quote.close.len()
        );
    }

    let field = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let records: Vec<RawBar> = data
        .timestamp
        .iter()
        .enumerate()
        .map(|(i, &ts)| RawBar {
            timestamp: DateTime::<Utc>::from_timestamp(ts, 0),
            open: field(&quote.open, i),
            high: field(&quote.high, i),
            low: field(&quote.low, i),
            close: field(&quote.close, i),
            volume: field(&quote.volume, i),
        })
        .collect();

    let skipped = records.iter().filter(|r| r.is_empty_row()).count();
    if skipped > 0 {
        debug!("{}: skipping {} rows without prices", ticker, skipped);
    }

    Ok(Series::from_records(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndicatorError;

    fn decode(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_bars_and_skips_empty_rows() {
        let response = decode(
            r#"{"chart":{"result":[{
                "meta":{"symbol":"AAPL"},
                "timestamp":[1704153600,1704240000,1704326400],
                "indicators":{"quote":[{
                    "open":[187.15,null,184.22],
                    "high":[188.44,null,185.88],
                    "low":[183.89,null,183.43],
                    "close":[185.64,null,184.25],
                    "volume":[82488700,null,58414500]
                }]}
            }],"error":null}}"#,
        );

        let series = parse_chart("AAPL", response).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes().collect::<Vec<_>>(), vec![185.64, 184.25]);
        assert_eq!(series.bars()[0].volume, Some(82488700.0));
        assert_eq!(series.bars()[1].open, Some(184.22));
        assert_eq!(
            series.first_timestamp(),
            DateTime::<Utc>::from_timestamp(1704153600, 0)
        );
    }

    #[test]
    fn api_error_is_surfaced() {
        let response = decode(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );
        match parse_chart("ZZZZ", response) {
            Err(ProviderError::Api { code, description }) => {
                assert_eq!(code, "Not Found");
                assert!(description.contains("delisted"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_result_is_empty_response() {
        let response = decode(r#"{"chart":{"result":[],"error":null}}"#);
        assert!(matches!(
            parse_chart("AAPL", response),
            Err(ProviderError::EmptyResponse(ref t)) if t == "AAPL"
        ));
    }

    #[test]
    fn row_without_close_is_missing_field() {
        let response = decode(
            r#"{"chart":{"result":[{
                "timestamp":[1704153600,1704240000],
                "indicators":{"quote":[{
                    "open":[187.15,184.0],
                    "close":[185.64,null]
                }]}
            }],"error":null}}"#,
        );
        assert!(matches!(
            parse_chart("AAPL", response),
            Err(ProviderError::Series(IndicatorError::MissingField { field: "close", index: 1 }))
        ));
    }

    #[test]
    fn chart_url_uses_configured_interval() {
        let provider = YahooProvider::new(&ProviderConfig {
            base_url: "https://example.test/".to_string(),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert_eq!(
            provider.chart_url("MSFT", "1mo"),
            "https://example.test/v8/finance/chart/MSFT?range=1mo&interval=1d"
        );
    }
}
