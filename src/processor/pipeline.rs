use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::chart::ChartRenderer;
use crate::indicators::IndicatorCalculator;
use crate::models::Series;
use crate::processor::job::AnalysisJob;
use crate::provider::MarketDataProvider;
use crate::utils::{format_time, measure_time};

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub series: Series,
    pub chart_path: PathBuf,
}

/// fetch → compute indicators → render, with both collaborators injected.
pub struct Pipeline {
    provider: Arc<dyn MarketDataProvider>,
    renderer: Arc<dyn ChartRenderer>,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn MarketDataProvider>, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self { provider, renderer }
    }

    #[instrument(skip(self, job), fields(job = %job))]
    pub async fn run(&self, job: &AnalysisJob) -> Result<AnalysisReport> {
        // Bad parameters should fail before any network traffic
        job.params.validate()?;

        let series = self.fetch(job).await?;
        let series = self.compute(job, &series)?;
        let chart_path = self.render(job, &series)?;

        Ok(AnalysisReport { series, chart_path })
    }

    pub async fn fetch(&self, job: &AnalysisJob) -> Result<Series> {
        let series = measure_time("fetch", async {
            self.provider
                .fetch_series(&job.ticker, &job.period)
                .await
                .with_context(|| format!("Failed to fetch data for {}", job))
        })
        .await?;

        match (series.first_timestamp(), series.last_timestamp()) {
            (Some(first), Some(last)) => info!(
                "Received {} bars for {} ({} to {})",
                series.len(),
                job.ticker,
                format_time(&first),
                format_time(&last)
            ),
            _ => warn!("No bars returned for {}", job),
        }

        Ok(series)
    }

    pub fn compute(&self, job: &AnalysisJob, series: &Series) -> Result<Series> {
        IndicatorCalculator::apply_all(series, &job.params)
            .with_context(|| format!("Failed to calculate indicators for {}", job))
    }

    pub fn render(&self, job: &AnalysisJob, series: &Series) -> Result<PathBuf> {
        let output = job.output_path();
        self.renderer
            .render(series, &job.ticker, &job.period, Some(&output))
            .with_context(|| format!("Failed to render chart for {}", job))
    }
}
