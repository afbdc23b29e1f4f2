/*!
 * Error types for the udaan translation broker.
 *
 * This module contains custom error types for the different parts of the
 * service, using the thiserror crate for ergonomic error definitions:
 * - `ValidationError`: request rejected before any engine is invoked
 * - `EngineError`: a single engine call failed (per item in bulk calls)
 * - `ProviderError`: transport-level failures of the remote engines
 * - `PersistenceError`: audit log storage failures
 * - `ConfigError`: fatal startup configuration problems
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised by the validator before dispatch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text is empty or whitespace only
    #[error("{}text must not be empty", at_index(.index))]
    EmptyText {
        /// Position in the batch, if the request was part of one
        index: Option<usize>,
    },

    /// Text exceeds the configured maximum length
    #[error("{}text is {length} characters long, the maximum is {max}", at_index(.index))]
    TooLong {
        /// Position in the batch, if the request was part of one
        index: Option<usize>,
        /// Length of the rejected text in characters
        length: usize,
        /// Configured maximum
        max: usize,
    },

    /// Language code is not in the configured supported set
    #[error("{}unsupported language code '{code}'", at_index(.index))]
    UnsupportedLanguage {
        /// Position in the batch, if the request was part of one
        index: Option<usize>,
        /// The rejected code
        code: String,
    },

    /// Bulk request without items
    #[error("bulk request must contain at least one item")]
    EmptyBatch,

    /// Bulk request above the configured item limit
    #[error("bulk request has {count} items, the maximum is {max}")]
    BatchTooLarge {
        /// Number of submitted items
        count: usize,
        /// Configured maximum
        max: usize,
    },
}

fn at_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("item {}: ", i),
        None => String::new(),
    }
}

impl ValidationError {
    /// Stable snake_case identifier of the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyText { .. } => "empty_text",
            Self::TooLong { .. } => "too_long",
            Self::UnsupportedLanguage { .. } => "unsupported_language",
            Self::EmptyBatch => "empty_batch",
            Self::BatchTooLarge { .. } => "batch_too_large",
        }
    }
}

/// Kind of an engine failure, as recorded in bulk results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    Timeout,
    BackendUnavailable,
    UnsupportedLanguage,
    RateLimited,
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::BackendUnavailable => "backend_unavailable",
            Self::UnsupportedLanguage => "unsupported_language",
            Self::RateLimited => "rate_limited",
        };
        f.write_str(s)
    }
}

/// Errors returned by a translation engine for a single call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The call did not finish within the per-call timeout
    #[error("engine call timed out after {after_ms} ms")]
    Timeout {
        /// Elapsed budget in milliseconds
        after_ms: u64,
    },

    /// The backend could not be reached or answered with an error
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend does not handle the requested language
    #[error("language not supported by engine: {0}")]
    UnsupportedLanguage(String),

    /// The backend refused the call because of rate limits or quota
    #[error("rate limited: {0}")]
    RateLimited(String),
}

impl EngineError {
    /// Kind of this failure
    pub fn kind(&self) -> EngineErrorKind {
        match self {
            Self::Timeout { .. } => EngineErrorKind::Timeout,
            Self::BackendUnavailable(_) => EngineErrorKind::BackendUnavailable,
            Self::UnsupportedLanguage(_) => EngineErrorKind::UnsupportedLanguage,
            Self::RateLimited(_) => EngineErrorKind::RateLimited,
        }
    }

    /// Build an error of the given kind with a message
    pub fn from_kind(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            EngineErrorKind::Timeout => Self::Timeout { after_ms: 0 },
            EngineErrorKind::BackendUnavailable => Self::BackendUnavailable(message),
            EngineErrorKind::UnsupportedLanguage => Self::UnsupportedLanguage(message),
            EngineErrorKind::RateLimited => Self::RateLimited(message),
        }
    }
}

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

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Provider-side quota exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

impl From<ProviderError> for EngineError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Timeout(_) => EngineError::Timeout { after_ms: 0 },
            ProviderError::RateLimitExceeded(msg) => EngineError::RateLimited(msg),
            ProviderError::QuotaExceeded(msg) => {
                EngineError::RateLimited(format!("quota exceeded: {}", msg))
            }
            other => EngineError::BackendUnavailable(other.to_string()),
        }
    }
}

/// Errors raised by the audit log store
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// SQLite reported an error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The database file or its directory could not be prepared
    #[error("database I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking database task did not complete
    #[error("database task failed: {0}")]
    Task(String),

    /// A stored row could not be decoded
    #[error("corrupt audit record {id}: {reason}")]
    CorruptRecord {
        /// Row identifier
        id: i64,
        /// What could not be decoded
        reason: String,
    },

    /// No location for the database file could be determined
    #[error("could not determine a data directory for the audit database")]
    NoDataDirectory,
}

/// Fatal configuration errors detected at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The selected engine needs credentials that were not provided
    #[error("engine '{engine}' requires an API key but none is configured")]
    MissingCredentials {
        /// Name of the selected engine
        engine: String,
    },

    /// A configuration value is out of range or malformed
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// A configured language code is not a valid ISO 639-1 code
    #[error("'{0}' is not a valid ISO 639-1 language code")]
    UnsupportedLanguageCode(String),
}

/// Errors surfaced by a single translation call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// Request rejected before dispatch
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The engine failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Errors surfaced by the statistics aggregator
#[derive(Error, Debug)]
pub enum StatsError {
    /// The requested window is not a positive number of days
    #[error("stats window must be at least one day, got {0}")]
    InvalidWindow(u32),

    /// The audit log could not be read
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error from an engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Error from the audit store
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Error from the stats aggregator
    #[error("Stats error: {0}")]
    Stats(#[from] StatsError),
}

impl From<TranslateError> for AppError {
    fn from(error: TranslateError) -> Self {
        match error {
            TranslateError::Validation(e) => Self::Validation(e),
            TranslateError::Engine(e) => Self::Engine(e),
        }
    }
}
