// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("invalid glob path: {0}")]
    InvalidGlob(String),

    /// The cache file could not be decoded: truncated, torn by a concurrent
    /// writer, or written by an incompatible schema version. `check_monitor`
    /// swallows this and reports a change instead.
    #[error("unusable cache file: {0}")]
    InvalidCache(String),

    #[error("cache encode failed: {0}")]
    Encode(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
