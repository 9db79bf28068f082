//! Error handling for the IPTV EPG service
//!
//! This module provides a hierarchical error system built on `thiserror`.
//! Repository-level code uses `anyhow::Result` directly; service-level code
//! returns [`AppResult`] so callers can match on the failure class.

mod types;

pub use types::{AppError, SourceError};

/// Convenient result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
