//! Error handling for the application

use thiserror::Error;

/// Deal evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DealError {
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
}

/// Historical-low tracking errors
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Source-adapter errors
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from {0}: {1}")]
    UnexpectedResponse(String, String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Adapter error: {0}")]
    AdapterError(String),

    #[error("Deal evaluation error: {0}")]
    DealError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<DealError> for AppError {
    fn from(err: DealError) -> Self {
        AppError::DealError(err.to_string())
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::DealError(err.to_string())
    }
}

impl From<AdapterError> for AppError {
    fn from(err: AdapterError) -> Self {
        AppError::AdapterError(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::StorageError(err.to_string())
    }
}
