//! Error classification and recovery.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    /// Unexpected status or body from the provider.
    Protocol,
    Server,
    Network,
    Timeout,
    /// The provider explicitly refused the exchange.
    Rejected,
    /// Forged, stale or incomplete authorization callback.
    Callback,
    Storage,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    /// Transient provider fault; keep the stored credential and try again later.
    RetryLater,
    /// Start the authorization flow again from the beginning.
    RestartFlow,
    CheckConfiguration,
    CheckStorage,
}
