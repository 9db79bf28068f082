//! Error type definitions for the IPTV EPG service

use thiserror::Error;

/// Top-level application error type
///
/// Represents all failure classes a service-level operation can surface.
/// Uses `thiserror` for automatic trait implementations and error chaining.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] anyhow::Error),

    /// Source handling errors (fetch, decompress, parse envelope)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a source error with a plain message
    pub fn source_error(message: impl Into<String>) -> Self {
        AppError::Source(SourceError::Other {
            message: message.into(),
        })
    }

    /// Create a configuration error with a plain message
    pub fn configuration(message: impl Into<String>) -> Self {
        AppError::Configuration {
            message: message.into(),
        }
    }
}

/// Errors raised while fetching or unwrapping upstream playlist/guide payloads
#[derive(Error, Debug)]
pub enum SourceError {
    /// Download exceeded the configured total timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Connection-level failure (DNS, refused, reset)
    #[error("Connection failed: {url} - {message}")]
    Connection { url: String, message: String },

    /// Upstream answered with a non-success status
    #[error("HTTP status {status}: {url}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The payload looked compressed but could not be decompressed.
    /// Unlike per-element parse failures this is fatal for the whole
    /// refresh: the entire payload is unusable.
    #[error("Decompression failed: {message}")]
    Decompression { message: String },

    /// Catch-all for other source-level failures
    #[error("{message}")]
    Other { message: String },
}
