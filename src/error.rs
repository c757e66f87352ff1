//! Error types for loading and aggregating indicator data.

use thiserror::Error;

/// Errors raised by the data layer.
///
/// "No data for this selection" is deliberately absent: an empty table or a
/// `NaN` cell is a valid result, not a failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed header or row in the source table.
    #[error("Parse error: {0}")]
    Parse(String),
    /// The aggregation request is incomplete or contradictory.
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

/// A specialized Result type for data-layer operations
pub type Result<T> = std::result::Result<T, Error>;
