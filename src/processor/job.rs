use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::chart::default_filename;
use crate::indicators::IndicatorParams;

/// Everything one analysis run needs: what to fetch, how to compute, where
/// to write the chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisJob {
    pub ticker: String,
    pub period: String,
    pub params: IndicatorParams,
    pub output: Option<PathBuf>,
}

impl AnalysisJob {
    pub fn new(ticker: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into().trim().to_uppercase(),
            period: period.into().trim().to_string(),
            params: IndicatorParams::default(),
            output: None,
        }
    }

    pub fn with_params(mut self, params: IndicatorParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Where the chart will be written.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_filename(&self.ticker, &self.period)))
    }
}

impl fmt::Display for AnalysisJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ticker, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_is_normalized() {
        let job = AnalysisJob::new(" aapl ", "1mo ");
        assert_eq!(job.ticker, "AAPL");
        assert_eq!(job.period, "1mo");
        assert_eq!(job.to_string(), "AAPL:1mo");
    }

    #[test]
    fn output_path_defaults_to_pattern() {
        let job = AnalysisJob::new("MSFT", "6mo");
        assert_eq!(job.output_path(), PathBuf::from("MSFT_6mo_stock_indicators.png"));

        let job = job.with_output(Some(PathBuf::from("out/chart.png")));
        assert_eq!(job.output_path(), PathBuf::from("out/chart.png"));
    }
}
