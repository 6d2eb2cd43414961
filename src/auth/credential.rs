use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::types::AccessTokenResult;

/// Upper bound on a stored token lifetime (100 years).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Per-user LinkedIn credential.
///
/// A present `access_token` is assumed valid until a profile fetch with it
/// reports otherwise; the token is then cleared but the record stays.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use newstler::auth::{AccessTokenResult, StoredCredential};
///
/// let now = Utc::now();
/// let exchanged = AccessTokenResult { access_token: "abc".to_string(), expires_in: 3600 };
/// let credential = StoredCredential::from_exchange("42", &exchanged, now);
/// assert!(credential.is_linked());
/// assert_eq!(credential.expires_at, Some(now + chrono::Duration::seconds(3600)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub owning_user_id: String,
    pub access_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredCredential {
    /// Credential produced by a code exchange completed at `now`.
    ///
    /// Lifetimes are capped at [`MAX_TOKEN_LIFETIME_SECS`] so the expiry
    /// always fits the stored timestamp format.
    pub fn from_exchange(
        user_id: impl Into<String>,
        token: &AccessTokenResult,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            owning_user_id: user_id.into(),
            access_token: Some(token.access_token.clone()),
            expires_at: Duration::try_seconds(token.expires_in.min(MAX_TOKEN_LIFETIME_SECS))
                .and_then(|lifetime| now.checked_add_signed(lifetime)),
        }
    }

    /// Record with no token, as left behind by an invalidated credential.
    pub fn cleared(user_id: impl Into<String>) -> Self {
        Self {
            owning_user_id: user_id.into(),
            access_token: None,
            expires_at: None,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchanged(expires_in: i64) -> AccessTokenResult {
        AccessTokenResult {
            access_token: "abc".to_string(),
            expires_in,
        }
    }

    #[test]
    fn huge_lifetime_is_capped() {
        let now = Utc::now();
        let credential = StoredCredential::from_exchange("42", &exchanged(9_000_000_000_000_000), now);
        assert_eq!(
            credential.expires_at,
            Some(now + Duration::seconds(MAX_TOKEN_LIFETIME_SECS))
        );
    }

    #[test]
    fn extreme_lifetime_does_not_panic() {
        let credential = StoredCredential::from_exchange("42", &exchanged(i64::MAX), Utc::now());
        assert!(credential.is_linked());
        assert!(credential.expires_at.is_some());
    }
}
