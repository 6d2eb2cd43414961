//! Values exchanged with the OAuth provider.

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// One login attempt: the anti-forgery state and the URL the user must visit.
///
/// The state is kept in the user's session until the callback consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub state: String,
    pub authorization_url: Url,
}

/// Result of a successful authorization-code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenResult {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// Profile data read from the provider with a bound token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub display_name: String,
    /// Title of the first listed position; absent when the provider reports
    /// no work history.
    pub position: Option<String>,
}

/// Generate a fresh 128-bit anti-forgery state as lowercase hex.
pub fn generate_state() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn state_is_32_hex_chars() {
        let state = generate_state();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn states_do_not_repeat() {
        let states: HashSet<String> = (0..1000).map(|_| generate_state()).collect();
        assert_eq!(states.len(), 1000);
    }
}
