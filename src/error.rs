use thiserror::Error;

/// Errors raised by the aggregation and series operations.
///
/// Missing numeric values are never reported here: they are forward-filled
/// or counted as zero by the operations themselves.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("unknown field '{field}'")]
    InvalidField { field: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("empty observation set")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, AggregateError>;
