use std::time::Duration;

use thiserror::Error;

/// Failure to obtain points of interest from a source. Never surfaced to
/// dashboard readers; the cache logs it and keeps its previous snapshot.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Source did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Source returned HTTP {0}")]
    Status(u16),

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// Failure of the traffic ingestion job. Propagated to whoever ran the job.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Traffic integration exceeded {0:?}")]
    Timeout(Duration),
}
