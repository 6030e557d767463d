use thiserror::Error;
use urlscout_scanner::ScanError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No valid URLs found in {0}")]
    NoUrls(String),

    #[error("Unknown report format '{0}' (expected text, json or csv)")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
