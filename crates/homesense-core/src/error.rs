use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomesenseError {
    #[error("Could not parse address from URL: {0}")]
    UnparseableUrl(String),
    #[error("No listing data found for {0}. The listing might be off-market or blocked.")]
    NoCandidates(String),
    #[error("Listing search failed: {0}")]
    OracleFault(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, HomesenseError>;
