//! Shell error type

use std::io;

use discover_lib::error::FetchError;

/// Errors that end the application.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Terminal setup, drawing or event stream failure.
    #[error("Terminal error: {0}")]
    Terminal(#[from] io::Error),

    /// The HTTP client could not be built (bad endpoint URL, TLS setup).
    #[error("Client setup failed: {0}")]
    Client(#[from] FetchError),

    /// The log file could not be opened or the logger was already set.
    #[error("Logger setup failed: {0}")]
    Logger(String),
}
