//! Error types for the geoquad index.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeoQuadError>;

/// Errors returned by index, codec and configuration operations.
///
/// Structural corruption of the tree is not represented here: it indicates a
/// codec/tree configuration mismatch and panics instead.
#[derive(Debug, Error)]
pub enum GeoQuadError {
    /// An argument was rejected at the API boundary. Nothing was mutated.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A configuration value is out of its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GeoQuadError {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        GeoQuadError::InvalidInput(msg.into())
    }
}
