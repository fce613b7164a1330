// src/cli.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::indicators::IndicatorParams;
use crate::processor::AnalysisJob;
use crate::provider::SUPPORTED_PERIODS;

pub const BANNER: &str = "Welcome to StockInsight - a tool for analysing stock market data.";
pub const EXAMPLE_TICKERS: &[&str] = &["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA"];

#[derive(Parser, Debug, Default)]
#[command(name = "stock-insight")]
#[command(about = "Plot moving average, RSI and MACD for a stock", long_about = None)]
pub struct Cli {
    /// Stock ticker (e.g. "AAPL"); prompted for when omitted
    #[arg(short, long)]
    pub ticker: Option<String>,

    /// Data period (e.g. "1mo"); prompted for when omitted
    #[arg(short, long)]
    pub period: Option<String>,

    /// Output PNG path (defaults to {ticker}_{period}_stock_indicators.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Moving average window
    #[arg(long)]
    pub ma_window: Option<usize>,

    /// RSI window
    #[arg(long)]
    pub rsi_window: Option<usize>,

    /// MACD fast EMA span
    #[arg(long)]
    pub macd_fast: Option<usize>,

    /// MACD slow EMA span
    #[arg(long)]
    pub macd_slow: Option<usize>,

    /// MACD signal EMA span
    #[arg(long)]
    pub macd_signal: Option<usize>,
}

impl Cli {
    /// Applies any indicator flags on top of the configured parameters.
    pub fn override_params(&self, mut params: IndicatorParams) -> IndicatorParams {
        if let Some(v) = self.ma_window {
            params.ma_window = v;
        }
        if let Some(v) = self.rsi_window {
            params.rsi_window = v;
        }
        if let Some(v) = self.macd_fast {
            params.macd_fast = v;
        }
        if let Some(v) = self.macd_slow {
            params.macd_slow = v;
        }
        if let Some(v) = self.macd_signal {
            params.macd_signal = v;
        }
        params
    }

    /// Builds the job, prompting on `input` for a ticker or period that was
    /// not given on the command line.
    pub fn into_job<R: BufRead, W: Write>(
        self,
        params: IndicatorParams,
        input: &mut R,
        out: &mut W,
    ) -> Result<AnalysisJob> {
        let params = self.override_params(params);

        let ticker = match self.ticker {
            Some(ticker) => ticker,
            None => prompt(input, out, "Enter a stock ticker (e.g. 'AAPL'): ")?,
        };
        let period = match self.period {
            Some(period) => period,
            None => prompt(input, out, "Enter a data period (e.g. '1mo'): ")?,
        };

        if ticker.trim().is_empty() {
            bail!("Ticker must not be empty");
        }
        if period.trim().is_empty() {
            bail!("Period must not be empty");
        }

        Ok(AnalysisJob::new(ticker, period)
            .with_params(params)
            .with_output(self.output))
    }
}

/// Prints the welcome banner with example tickers and periods.
pub fn print_banner<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{}", BANNER)?;
    writeln!(out, "Example tickers: {}.", EXAMPLE_TICKERS.join(", "))?;
    writeln!(out, "Example periods: {}.", SUPPORTED_PERIODS.join(", "))?;
    Ok(())
}

/// Reads one trimmed line after printing `message`.
pub fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<String> {
    write!(out, "{}", message)?;
    out.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read from stdin")?;
    if read == 0 {
        bail!("Input closed before a value was entered");
    }
    Ok(line.trim().to_string())
}
