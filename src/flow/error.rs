use thiserror::Error;

use crate::error::{ErrorCategory, NewstlerError, RecoverySuggestion};

/// Failure surfaced to the presentation layer.
///
/// `Display` is safe to show to users: it never says which callback check
/// failed and never includes raw transport detail. The underlying error is
/// kept as the source for logging.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("LinkedIn authorization failed, please try linking your account again")]
    InvalidCallback,

    #[error("LinkedIn did not accept the authorization, please try linking your account again")]
    Rejected(#[source] NewstlerError),

    #[error("LinkedIn is temporarily unavailable, please try again later")]
    Unavailable(#[source] NewstlerError),

    #[error("The service is misconfigured")]
    Misconfigured(#[source] NewstlerError),

    #[error("Could not access stored account data")]
    Storage(#[source] NewstlerError),
}

impl FlowError {
    /// Text for the user.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Underlying error, absent for a failed callback check.
    pub fn cause(&self) -> Option<&NewstlerError> {
        match self {
            Self::InvalidCallback => None,
            Self::Rejected(err)
            | Self::Unavailable(err)
            | Self::Misconfigured(err)
            | Self::Storage(err) => Some(err),
        }
    }

    /// What the user or operator should do next.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        self.cause()
            .map(NewstlerError::recovery_suggestion)
            .unwrap_or(RecoverySuggestion::RestartFlow)
    }

    /// Whether the same request may succeed later without user action.
    pub fn is_retryable(&self) -> bool {
        self.cause().is_some_and(NewstlerError::is_retryable)
    }

    /// Whether the user must restart the authorization flow.
    pub fn requires_reauthorization(&self) -> bool {
        matches!(self, Self::InvalidCallback | Self::Rejected(_))
    }
}

impl From<NewstlerError> for FlowError {
    fn from(error: NewstlerError) -> Self {
        match error.category() {
            ErrorCategory::Callback => Self::InvalidCallback,
            ErrorCategory::Rejected => Self::Rejected(error),
            ErrorCategory::Configuration => Self::Misconfigured(error),
            ErrorCategory::Storage => Self::Storage(error),
            ErrorCategory::Protocol
            | ErrorCategory::Server
            | ErrorCategory::Network
            | ErrorCategory::Timeout => Self::Unavailable(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_detail_is_not_shown_to_users() {
        let err = FlowError::from(NewstlerError::protocol(502, "upstream said: secret detail"));
        assert!(matches!(err, FlowError::Unavailable(_)));
        assert!(!err.user_message().contains("secret detail"));
        assert!(!err.requires_reauthorization());
    }

    #[test]
    fn rejected_exchange_requires_reauthorization() {
        let err = FlowError::from(NewstlerError::ProviderRejected {
            error: "invalid_grant".to_string(),
            description: None,
        });
        assert!(err.requires_reauthorization());
    }

    #[test]
    fn timeouts_are_transient() {
        let err = FlowError::from(NewstlerError::Timeout(30_000));
        assert!(matches!(err, FlowError::Unavailable(_)));
    }

    #[test]
    fn suggestions_follow_the_cause() {
        assert_eq!(
            FlowError::InvalidCallback.recovery_suggestion(),
            RecoverySuggestion::RestartFlow
        );
        let outage = FlowError::from(NewstlerError::protocol(503, "down"));
        assert!(outage.is_retryable());
        assert_eq!(outage.recovery_suggestion(), RecoverySuggestion::RetryLater);
        let disk = FlowError::from(NewstlerError::Storage("disk full".to_string()));
        assert!(!disk.is_retryable());
        assert_eq!(disk.recovery_suggestion(), RecoverySuggestion::CheckStorage);
    }
}
