//! Error taxonomy for the simulation core.

use thiserror::Error;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, MarkowitzError>;

/// Errors surfaced by the returns calculator, simulator and selector.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarkowitzError {
    /// Fewer rows or assets than an operation needs.
    #[error("Insufficient data for {context}: need at least {required}, got {available}")]
    InsufficientData {
        context: String,
        required: usize,
        available: usize,
    },

    /// A caller-supplied parameter is outside its valid domain.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// An operation that needs at least one element received none.
    #[error("Empty input provided for {context}")]
    EmptyInput { context: String },

    /// A return value is undefined, usually because a price was missing.
    #[error("Missing return for asset {asset} on {date}")]
    MissingData { asset: String, date: String },

    /// A return is NaN or infinite.
    #[error("Non-finite return {value} for asset {asset} on {date}")]
    NonFiniteData {
        asset: String,
        date: String,
        value: f64,
    },

    /// A price table violates its shape or ordering invariants.
    #[error("Invalid price table: {message}")]
    InvalidPriceTable { message: String },

    /// A return table violates its shape or ordering invariants.
    #[error("Invalid return table: {message}")]
    InvalidReturnTable { message: String },
}

impl MarkowitzError {
    pub fn insufficient_data(context: impl Into<String>, required: usize, available: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            required,
            available,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn empty_input(context: impl Into<String>) -> Self {
        Self::EmptyInput {
            context: context.into(),
        }
    }

    pub fn invalid_price_table(message: impl Into<String>) -> Self {
        Self::InvalidPriceTable {
            message: message.into(),
        }
    }

    pub fn invalid_return_table(message: impl Into<String>) -> Self {
        Self::InvalidReturnTable {
            message: message.into(),
        }
    }
}
