use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::{IndicatorError, Result};
use crate::models::bar::{Bar, RawBar};

/// One value per bar; `None` marks bars inside an indicator's warm-up period.
pub type DerivedColumn = Arc<[Option<f64>]>;

/// An ordered, immutable run of bars plus the indicator columns derived from it.
///
/// Bars are shared between copies, so adding a column is copy-on-write: the
/// series that went in is left untouched and the one returned carries the
/// extra column.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    bars: Arc<[Bar]>,
    moving_average: Option<DerivedColumn>,
    rsi: Option<DerivedColumn>,
    macd_line: Option<DerivedColumn>,
    signal_line: Option<DerivedColumn>,
}

impl Default for Series {
    fn default() -> Self {
        Self {
            bars: Arc::from(Vec::<Bar>::new()),
            moving_average: None,
            rsi: None,
            macd_line: None,
            signal_line: None,
        }
    }
}

impl Series {
    /// Builds a series, checking that timestamps strictly increase and every
    /// close is finite.
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        for (index, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(IndicatorError::NonFiniteClose { index });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(IndicatorError::UnorderedTimestamps { index });
            }
        }

        Ok(Self {
            bars: Arc::from(bars),
            ..Self::default()
        })
    }

    /// Builds a series from source records. Rows with no prices at all are
    /// dropped; a row with prices but no close is an error.
    pub fn from_records(records: Vec<RawBar>) -> Result<Self> {
        let mut bars = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            if record.is_empty_row() {
                continue;
            }
            let timestamp = record
                .timestamp
                .ok_or(IndicatorError::MissingField { field: "timestamp", index })?;
            let close = record
                .close
                .ok_or(IndicatorError::MissingField { field: "close", index })?;

            bars.push(Bar {
                timestamp,
                close,
                open: record.open,
                high: record.high,
                low: record.low,
                volume: record.volume,
            });
        }

        Self::new(bars)
    }

    /// Convenience for building a series from `(timestamp, close)` pairs.
    pub fn from_closes<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (DateTime<Utc>, f64)>,
    {
        Self::new(points.into_iter().map(|(ts, close)| Bar::new(ts, close)).collect())
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|bar| bar.close)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.bars.iter().map(|bar| bar.timestamp)
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.first().map(|bar| bar.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|bar| bar.timestamp)
    }

    pub fn moving_average(&self) -> Option<&[Option<f64>]> {
        self.moving_average.as_deref()
    }

    pub fn rsi(&self) -> Option<&[Option<f64>]> {
        self.rsi.as_deref()
    }

    pub fn macd_line(&self) -> Option<&[Option<f64>]> {
        self.macd_line.as_deref()
    }

    pub fn signal_line(&self) -> Option<&[Option<f64>]> {
        self.signal_line.as_deref()
    }

    /// MACD minus signal, available once both lines have been calculated.
    pub fn macd_histogram(&self) -> Option<Vec<Option<f64>>> {
        let macd = self.macd_line()?;
        let signal = self.signal_line()?;
        Some(
            macd.iter()
                .zip(signal)
                .map(|(m, s)| match (m, s) {
                    (Some(m), Some(s)) => Some(m - s),
                    _ => None,
                })
                .collect(),
        )
    }

    /// Same bars with every derived column dropped.
    pub fn without_indicators(&self) -> Self {
        Self {
            bars: Arc::clone(&self.bars),
            ..Self::default()
        }
    }

    pub(crate) fn with_moving_average(&self, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(values.len(), self.len());
        Self {
            moving_average: Some(values.into()),
            ..self.clone()
        }
    }

    pub(crate) fn with_rsi(&self, values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(values.len(), self.len());
        Self {
            rsi: Some(values.into()),
            ..self.clone()
        }
    }

    pub(crate) fn with_macd(&self, macd_line: Vec<Option<f64>>, signal_line: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(macd_line.len(), self.len());
        debug_assert_eq!(signal_line.len(), self.len());
        Self {
            macd_line: Some(macd_line.into()),
            signal_line: Some(signal_line.into()),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let bars = vec![Bar::new(day(0), 1.0), Bar::new(day(0), 2.0)];
        assert_eq!(
            Series::new(bars),
            Err(IndicatorError::UnorderedTimestamps { index: 1 })
        );
    }

    #[test]
    fn rejects_descending_timestamps() {
        let bars = vec![Bar::new(day(2), 1.0), Bar::new(day(1), 2.0)];
        assert!(matches!(
            Series::new(bars),
            Err(IndicatorError::UnorderedTimestamps { index: 1 })
        ));
    }

    #[test]
    fn rejects_non_finite_close() {
        let bars = vec![Bar::new(day(0), 1.0), Bar::new(day(1), f64::NAN)];
        assert_eq!(
            Series::new(bars),
            Err(IndicatorError::NonFiniteClose { index: 1 })
        );
    }

    #[test]
    fn records_without_close_are_missing_field() {
        let records = vec![
            RawBar {
                timestamp: Some(day(0)),
                close: Some(10.0),
                ..RawBar::default()
            },
            RawBar {
                timestamp: Some(day(1)),
                open: Some(10.5),
                ..RawBar::default()
            },
        ];
        assert_eq!(
            Series::from_records(records),
            Err(IndicatorError::MissingField { field: "close", index: 1 })
        );
    }

    #[test]
    fn records_with_no_prices_are_skipped() {
        let records = vec![
            RawBar {
                timestamp: Some(day(0)),
                close: Some(10.0),
                volume: Some(100.0),
                ..RawBar::default()
            },
            RawBar {
                timestamp: Some(day(1)),
                ..RawBar::default()
            },
            RawBar {
                timestamp: Some(day(2)),
                close: Some(11.0),
                ..RawBar::default()
            },
        ];
        let series = Series::from_records(records).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].volume, Some(100.0));
        assert_eq!(series.closes().collect::<Vec<_>>(), vec![10.0, 11.0]);
    }

    #[test]
    fn adding_a_column_leaves_the_input_untouched() {
        let series = Series::from_closes((0..3).map(|i| (day(i), i as f64))).unwrap();
        let with_ma = series.with_moving_average(vec![None, Some(0.5), Some(1.5)]);

        assert!(series.moving_average().is_none());
        assert_eq!(with_ma.moving_average().unwrap()[2], Some(1.5));
        assert_eq!(with_ma.bars(), series.bars());
        assert!(with_ma.without_indicators().moving_average().is_none());
    }

    #[test]
    fn histogram_needs_both_lines() {
        let series = Series::from_closes((0..2).map(|i| (day(i), 1.0))).unwrap();
        assert!(series.macd_histogram().is_none());

        let with_macd = series.with_macd(vec![Some(1.0), Some(0.5)], vec![Some(0.25), Some(0.5)]);
        assert_eq!(with_macd.macd_histogram(), Some(vec![Some(0.75), Some(0.0)]));
    }

    #[test]
    fn empty_series_is_valid() {
        let series = Series::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.first_timestamp().is_none());
    }
}
