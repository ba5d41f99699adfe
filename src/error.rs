//! Error types for the discord-dl application.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // API errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Server error: HTTP {0}")]
    ServerError(u16),

    // Path building errors
    #[error("Template error: {0}")]
    Template(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Whether the failure is worth retrying after a backoff.
    ///
    /// Connection problems, timeouts, rate limiting and 5xx responses are
    /// transient. Everything else (bad token, missing channel, malformed
    /// payload) will fail the same way on the next attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimited(_) | Error::ServerError(_) => true,
            Error::Http(e) => e.is_connect() || e.is_timeout() || e.is_request() || e.is_body(),
            _ => false,
        }
    }

    /// Minimum wait the server asked for before the next request.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited(seconds) => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }

    /// Whether this error belongs to the configuration class.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_)
                | Error::Template(_)
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const UNEXPECTED_ERROR: i32 = 5;
    pub const SOME_CHANNELS_FAILED: i32 = 6;
}
