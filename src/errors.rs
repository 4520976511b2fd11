/*!
 * Error types for the greyparrot application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the AI translation backend
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// No project configuration file was found
    #[error("Project configuration not found at {0:?}")]
    ConfigurationMissing(PathBuf),

    /// The configuration file exists but is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A credential required for a network call is absent
    #[error("Missing {0} in environment or .env file")]
    MissingCredential(String),

    /// A directory or file could not be read or written
    #[error("File error at {path:?}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An include/exclude glob could not be compiled
    #[error("Invalid glob pattern: {0}")]
    Pattern(String),

    /// The dashboard could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The dashboard answered with a non-success status
    #[error("Remote error ({status}): {message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Remote-provided message, or a generic one
        message: String,
    },

    /// The reuse-then-translate stage failed as a whole
    #[error("Reconciliation failed: {0}")]
    Reconciliation(String),

    /// Error from the AI backend
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the local translation store
    #[error("Storage error: {0}")]
    Storage(String),

    /// File watcher failure
    #[error("Watch error: {0}")]
    Watch(String),

    /// Any other error
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}

impl From<notify::Error> for AppError {
    fn from(error: notify::Error) -> Self {
        Self::Watch(error.to_string())
    }
}

impl From<globset::Error> for AppError {
    fn from(error: globset::Error) -> Self {
        Self::Pattern(error.to_string())
    }
}
