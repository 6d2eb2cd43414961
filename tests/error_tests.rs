//! Tests for error classification and the user-facing flow errors.

use newstler::error::{ConfigurationError, ErrorCategory, NewstlerError, RecoverySuggestion};
use newstler::flow::FlowError;

#[test]
fn rejection_is_not_retryable() {
    let err = NewstlerError::ProviderRejected {
        error: "invalid_grant".to_string(),
        description: None,
    };
    assert_eq!(err.category(), ErrorCategory::Rejected);
    assert!(!err.is_retryable());
    assert_eq!(err.recovery_suggestion(), RecoverySuggestion::RestartFlow);
}

#[test]
fn client_side_protocol_errors_stay_protocol() {
    let err = NewstlerError::protocol(404, "no such endpoint");
    assert_eq!(err.category(), ErrorCategory::Protocol);
    assert!(err.to_string().contains("404"));
}

#[test]
fn registry_misuse_points_at_configuration() {
    let err = NewstlerError::from(ConfigurationError::AlreadyConfigured);
    assert_eq!(err.category(), ErrorCategory::Configuration);
    assert_eq!(err.recovery_suggestion(), RecoverySuggestion::CheckConfiguration);
    assert!(matches!(
        FlowError::from(err),
        FlowError::Misconfigured(_)
    ));
}

#[test]
fn callback_failures_share_one_message() {
    let err = FlowError::from(NewstlerError::CallbackValidation);
    assert!(matches!(err, FlowError::InvalidCallback));
    assert_eq!(
        err.user_message(),
        "LinkedIn authorization failed, please try linking your account again"
    );
}

#[test]
fn timeouts_are_reported_as_unavailable() {
    let err = FlowError::from(NewstlerError::Timeout(30_000));
    assert!(matches!(err, FlowError::Unavailable(_)));
    assert!(!err.user_message().contains("30000"));
}

#[test]
fn storage_failures_keep_their_source() {
    let err = FlowError::from(NewstlerError::Storage("disk full".to_string()));
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("Storage error: disk full"));
}
