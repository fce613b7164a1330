// src/main.rs
use anyhow::Result;
use clap::Parser;
use std::io;
use std::sync::Arc;
use stock_insight::chart::PngChartRenderer;
use stock_insight::cli::{print_banner, Cli};
use stock_insight::config::AppConfig;
use stock_insight::processor::Pipeline;
use stock_insight::provider::YahooProvider;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let stdout = io::stdout();
    print_banner(&mut stdout.lock())?;

    let job = cli.into_job(
        config.indicators.to_params()?,
        &mut io::stdin().lock(),
        &mut stdout.lock(),
    )?;

    let provider = Arc::new(YahooProvider::new(&config.provider)?);
    let renderer = Arc::new(PngChartRenderer::new(config.chart.clone()));
    let pipeline = Pipeline::new(provider, renderer);

    let report = pipeline.run(&job).await?;
    println!("Chart saved as {}", report.chart_path.display());

    Ok(())
}
