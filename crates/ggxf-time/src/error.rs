//! Error types for time function construction.

use thiserror::Error;

/// Result type for time function operations.
pub type TimeResult<T> = Result<T, TimeError>;

/// Errors raised while building a time function from its definition.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimeError {
    #[error("Time function definition does not include functionType")]
    MissingFunctionType,

    #[error("Unrecognized time function type {name}")]
    UnknownFunctionType { name: String },

    #[error("Unexpected parameter {key} in {function} definition")]
    UnexpectedParameter { function: &'static str, key: String },

    #[error("Missing value {key} in {function} definition")]
    MissingParameter {
        function: &'static str,
        key: &'static str,
    },

    #[error("Invalid value {value} for {key} in {function} definition")]
    InvalidValue {
        function: &'static str,
        key: String,
        value: String,
    },

    #[error("Invalid date format {text}")]
    InvalidDate { text: String },

    #[error("Invalid epoch window in {function} definition: {start} to {end}")]
    InvalidWindow {
        function: &'static str,
        start: f64,
        end: f64,
    },
}
