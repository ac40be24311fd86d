use thiserror::Error;

/// Rejected timestamp input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("{field} must be a valid number")]
    NotANumber { field: String },

    #[error("{field} cannot be negative")]
    Negative { field: String },
}
