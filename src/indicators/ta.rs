// Streaming building blocks for the series-level indicator functions.
// Each indicator is fed one value at a time and reports the value for that step.

use std::collections::VecDeque;

use crate::error::{validate_period, Result};

/// The `Next` trait is used for indicators that produce one output per input
pub trait Next<T> {
    type Output;
    fn next(&mut self, input: T) -> Self::Output;
}

/// Simple Moving Average over the last `period` inputs.
///
/// Yields `None` until `period` values have been seen. The mean is taken over
/// the values currently in the window, summed in arrival order, so it does not
/// drift the way a running add/subtract total does.
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    window: VecDeque<f64>,
}

impl SimpleMovingAverage {
    pub fn new(period: usize) -> Result<Self> {
        let period = validate_period("period", period)?;

        Ok(Self {
            period,
            window: VecDeque::with_capacity(period),
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Next<f64> for SimpleMovingAverage {
    type Output = Option<f64>;

    fn next(&mut self, input: f64) -> Self::Output {
        if self.window.len() == self.period {
            self.window.pop_front();
        }
        self.window.push_back(input);

        if self.window.len() < self.period {
            return None;
        }

        Some(self.window.iter().sum::<f64>() / self.period as f64)
    }
}

/// Exponential Moving Average, `alpha = 2 / (span + 1)`.
///
/// Seeded with the first input and updated recursively afterwards, so it has
/// a value from the very first step.
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    value: Option<f64>,
}

impl ExponentialMovingAverage {
    pub fn new(span: usize) -> Result<Self> {
        let span = validate_period("span", span)?;

        Ok(Self {
            alpha: 2.0 / (span as f64 + 1.0),
            value: None,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Next<f64> for ExponentialMovingAverage {
    type Output = f64;

    fn next(&mut self, input: f64) -> Self::Output {
        let value = match self.value {
            None => input,
            Some(prev) => self.alpha * input + (1.0 - self.alpha) * prev,
        };
        self.value = Some(value);
        value
    }
}

/// Relative Strength Index with simple (not Wilder-smoothed) averages.
///
/// Gains and losses are averaged over the last `period` price changes. A
/// window with no losses gives exactly 100, one with neither gains nor losses
/// gives NaN.
#[derive(Debug, Clone)]
pub struct RelativeStrengthIndex {
    prev_value: Option<f64>,
    gains: SimpleMovingAverage,
    losses: SimpleMovingAverage,
}

impl RelativeStrengthIndex {
    pub fn new(period: usize) -> Result<Self> {
        let period = validate_period("window", period)?;

        Ok(Self {
            prev_value: None,
            gains: SimpleMovingAverage::new(period)?,
            losses: SimpleMovingAverage::new(period)?,
        })
    }
}

impl Next<f64> for RelativeStrengthIndex {
    type Output = Option<f64>;

    fn next(&mut self, input: f64) -> Self::Output {
        let prev = self.prev_value.replace(input)?;
        let change = input - prev;

        let avg_gain = self.gains.next(change.max(0.0));
        let avg_loss = self.losses.next((-change).max(0.0));

        match (avg_gain, avg_loss) {
            (Some(avg_gain), Some(avg_loss)) => {
                // x/0 -> inf -> 100, 0/0 -> NaN; both are kept as-is
                let rs = avg_gain / avg_loss;
                Some(100.0 - 100.0 / (1.0 + rs))
            }
            _ => None,
        }
    }
}

/// MACD output for a single step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Moving Average Convergence Divergence
///
/// No ordering is enforced between the fast and slow spans; a "fast" span
/// longer than the slow one still produces output.
#[derive(Debug, Clone)]
pub struct MovingAverageConvergenceDivergence {
    fast_ema: ExponentialMovingAverage,
    slow_ema: ExponentialMovingAverage,
    signal_ema: ExponentialMovingAverage,
}

impl MovingAverageConvergenceDivergence {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Result<Self> {
        let fast_period = validate_period("fast_period", fast_period)?;
        let slow_period = validate_period("slow_period", slow_period)?;
        let signal_period = validate_period("signal_period", signal_period)?;

        Ok(Self {
            fast_ema: ExponentialMovingAverage::new(fast_period)?,
            slow_ema: ExponentialMovingAverage::new(slow_period)?,
            signal_ema: ExponentialMovingAverage::new(signal_period)?,
        })
    }
}

impl Next<f64> for MovingAverageConvergenceDivergence {
    type Output = MacdOutput;

    fn next(&mut self, input: f64) -> Self::Output {
        let macd = self.fast_ema.next(input) - self.slow_ema.next(input);
        let signal = self.signal_ema.next(macd);

        MacdOutput {
            macd,
            signal,
            histogram: macd - signal,
        }
    }
}
