/*!
 * Error types for the booktrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
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
}

impl ProviderError {
    /// Classify a non-success HTTP status returned by a provider
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors raised by the tokenizer
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The BPE ranks could not be loaded
    #[error("Failed to load tokenizer '{encoding}': {message}")]
    Load { encoding: String, message: String },
}

/// Errors raised while fetching the source document
#[derive(Error, Debug)]
pub enum SourceError {
    /// The location is neither a supported URL nor a readable path
    #[error("Unsupported document location: {0}")]
    UnsupportedLocation(String),

    /// The remote server could not be reached or answered with an error
    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    /// The local file could not be read
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },
}

/// Errors raised while persisting the translated document
#[derive(Error, Debug)]
pub enum StorageError {
    /// The storage location could not be prepared
    #[error("Storage location unavailable: {0}")]
    Unavailable(String),

    /// The object could not be written
    #[error("Failed to write object '{key}': {message}")]
    Write { key: String, message: String },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the tokenizer
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    /// A translation call failed; the whole run is aborted
    #[error("Translation failed for batch {index} of {total}: {source}")]
    BatchFailed {
        /// 1-based index of the failing batch
        index: usize,
        /// Number of batches scheduled for translation
        total: usize,
        #[source]
        source: ProviderError,
    },

    /// A fragment that cannot be bisected any further is still over the ceiling
    #[error("Fragment of {tokens} tokens cannot be split below the hard limit of {limit} tokens")]
    FragmentTooLarge { tokens: usize, limit: usize },

    /// Internal consistency check failed
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Broad classification used to decide how a failure is reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request or unreachable document; the pipeline never started
    Input,
    /// Tokenizer, translation service, or storage failure
    Collaborator,
    /// A defect in the pipeline itself
    Invariant,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// The request is missing fields or carries invalid values
    #[error("Invalid request parameters: {0}")]
    InvalidRequest(String),

    /// The source document could not be fetched
    #[error("Failed to download the file from the provided URL: {0}")]
    DocumentUnavailable(#[from] SourceError),

    /// The configuration is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from the blob store
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Classify this error for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_) | Self::DocumentUnavailable(_) | Self::Config(_) => ErrorKind::Input,
            Self::Translation(TranslationError::FragmentTooLarge { .. }) => ErrorKind::Input,
            Self::Translation(TranslationError::Invariant(_)) => ErrorKind::Invariant,
            Self::Translation(_) | Self::Storage(_) | Self::File(_) | Self::Unknown(_) => ErrorKind::Collaborator,
        }
    }

    /// Whether the caller can fix this by changing the request
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Input
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
