//! Error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop the application from starting or shutting down cleanly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("failed to open log file {}: {source}", path.display())]
    LogFile { path: PathBuf, source: io::Error },

    #[error("invalid log filter: {0}")]
    LogFilter(String),
}

/// Failures reported by the media library while looking for images.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("media directory {} is not readable: {source}", path.display())]
    Unreadable { path: PathBuf, source: io::Error },

    #[error("failed to walk media directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("media scan was abandoned")]
    Abandoned,
}
