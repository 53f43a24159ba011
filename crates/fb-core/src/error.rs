use thiserror::Error;

pub type FbResult<T> = Result<T, FbError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FbError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Value for {what} must be positive: {value}")]
    NotPositive { what: &'static str, value: f64 },

    #[error("Value for {what} must not be negative: {value}")]
    Negative { what: &'static str, value: f64 },

    #[error("Value for {what} out of range [{min}, {max}]: {value}")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
