pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod processor;
pub mod provider;
pub mod utils;

pub use error::IndicatorError;
pub use indicators::{calculate_macd, calculate_rsi, moving_average, IndicatorCalculator, IndicatorParams};
pub use models::{Bar, Series};
