//! Error types for Newstler.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Registry lifecycle misuse. Always a programming error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("service registry is not configured yet; configure it at program start")]
    NotConfigured,

    #[error("service registry is already configured; switching it at runtime is forbidden")]
    AlreadyConfigured,

    #[error("missing configuration key `{section}.{key}`")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },

    #[error("invalid configuration value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },

    #[error("{0}")]
    Other(String),
}

/// Primary error type for all Newstler operations.
#[derive(Error, Debug)]
pub enum NewstlerError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unexpected response from provider (status {status}): {message}")]
    Protocol { status: u16, message: String },

    #[error("Provider rejected the request: {error}")]
    ProviderRejected {
        error: String,
        description: Option<String>,
    },

    #[error("Authorization callback did not match the pending request")]
    CallbackValidation,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl NewstlerError {
    /// Create a protocol error for an unexpected provider status.
    pub fn protocol(status: u16, message: impl Into<String>) -> Self {
        Self::Protocol {
            status,
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Protocol { status, .. } => match status {
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Protocol,
            },
            Self::ProviderRejected { .. } => ErrorCategory::Rejected,
            Self::CallbackValidation => ErrorCategory::Callback,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Serialization(_) => ErrorCategory::Protocol,
            Self::Io(_) | Self::Storage(_) => ErrorCategory::Storage,
        }
    }

    /// Whether trying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Protocol
                | ErrorCategory::Server
                | ErrorCategory::Network
                | ErrorCategory::Timeout
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Rejected | ErrorCategory::Callback => RecoverySuggestion::RestartFlow,
            ErrorCategory::Protocol
            | ErrorCategory::Server
            | ErrorCategory::Network
            | ErrorCategory::Timeout => RecoverySuggestion::RetryLater,
            ErrorCategory::Storage => RecoverySuggestion::CheckStorage,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, NewstlerError>;
