//! Error types for Finsight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer samples than the operation's minimum (e.g. <7 days of spending
    /// history for a forecast, or an empty analysis window).
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Out-of-domain input values (non-positive income, negative savings, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Collaborator data is absent entirely (no goals, no matching category).
    /// Distinct from a computation error.
    #[error("No data: {0}")]
    NoData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
