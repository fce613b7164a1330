use thiserror::Error;

/// Errors raised by series construction and indicator calculation.
///
/// Numeric degeneracies such as a zero average loss in RSI are not errors;
/// they show up as infinity/NaN in the derived column instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// A window or period argument is not a positive integer.
    #[error("invalid parameter `{name}`: {value} (must be a positive integer)")]
    InvalidParameter { name: &'static str, value: i64 },

    /// A required column is absent from a raw record.
    #[error("missing required field `{field}` at row {index}")]
    MissingField { field: &'static str, index: usize },

    /// Timestamps must be strictly increasing.
    #[error("timestamp at row {index} is not after the previous bar")]
    UnorderedTimestamps { index: usize },

    #[error("close price at row {index} is not a finite number")]
    NonFiniteClose { index: usize },
}

pub type Result<T> = std::result::Result<T, IndicatorError>;

/// Checks that a window/period argument is usable.
pub fn validate_period(name: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(IndicatorError::InvalidParameter { name, value: 0 });
    }
    Ok(value)
}

/// Converts a signed argument (config files, JSON) into a period.
pub fn period_from_i64(name: &'static str, value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(IndicatorError::InvalidParameter { name, value });
    }
    usize::try_from(value).map_err(|_| IndicatorError::InvalidParameter { name, value })
}
