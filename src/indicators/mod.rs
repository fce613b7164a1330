pub mod calculator;
pub mod oscillators;
pub mod overlaps;
pub mod ta;

pub use self::calculator::{IndicatorCalculator, IndicatorParams};
pub use self::oscillators::{calculate_macd, calculate_rsi};
pub use self::overlaps::moving_average;
