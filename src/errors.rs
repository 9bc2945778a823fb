/*!
 * Error types for the tixobot application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
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

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not complete in time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() || error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors that can occur while loading a FAQ catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file could not be read
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The catalog is not a valid list of records
    #[error("Invalid catalog format: {0}")]
    Parse(#[from] serde_json::Error),

    /// A record has a blank question
    #[error("Catalog entry {index} has an empty question")]
    EmptyQuestion { index: usize },

    /// A record has a blank answer
    #[error("Catalog entry {index} has an empty answer")]
    EmptyAnswer { index: usize },

    /// A record carries an unsupported language tag
    #[error("Catalog entry {index} has unsupported language '{code}'")]
    InvalidLanguage { index: usize, code: String },
}

/// Errors that can occur while building or running the assistant
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Error from the FAQ catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Error from the LLM or notification provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Invalid assistant configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
