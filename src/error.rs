//! Error types shared by the ingestion pipeline and storage backends.

use thiserror::Error;

/// Errors produced while configuring, building, or writing the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A required configuration value is missing or out of range.
    /// Raised before any I/O happens.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An organisation reached the record builder without a usable name.
    /// The organisation is skipped; processing continues.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A conditional insert collided with an existing entry. The entry is
    /// skipped; the rest of its batch is unaffected.
    #[error("duplicate key {partition}/{sort}")]
    DuplicateKey { partition: String, sort: String },

    /// One or more batches still had unwritten items after every retry
    /// attempt. Sample keys are reported alongside the seed counts.
    #[error("{batches} batch(es) incomplete after retries, {remaining} entries unwritten")]
    PartialBatchFailure { batches: usize, remaining: usize },

    /// The store was unreachable or rejected the connection.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl From<sqlx::Error> for IndexError {
    fn from(err: sqlx::Error) -> Self {
        IndexError::Transport(err.into())
    }
}
