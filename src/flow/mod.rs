//! LinkedIn account linking: the authorization-code redirect flow.
//!
//! Per user the flow moves through
//! `NoToken -> AwaitingCallback -> TokenObtained`, and back to `NoToken`
//! when the provider stops accepting the stored token. The position is not
//! held in memory: it is derived from the stored credential and the pending
//! state in the user's session.

pub mod error;

pub use error::FlowError;

use std::sync::Arc;

use chrono::Utc;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::{CredentialStore, SessionStore, StoredCredential, UserProfile};
use crate::error::NewstlerError;
use crate::news::NewsArticle;
use crate::registry::ServiceRegistry;

/// Session key holding the pending anti-forgery state.
pub const STATE_SESSION_KEY: &str = "state";

/// Position of a user in the authorization state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    NoToken,
    AwaitingCallback,
    TokenObtained,
}

/// What the caller should do after [`AuthorizationFlow::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStep {
    /// Send the user to the provider's consent page.
    Authorize { authorization_url: Url },
    /// The account is already linked; go straight to the feed.
    Linked,
}

/// Query parameters of the provider's redirect back to us.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user declined or the request was invalid.
    pub error: Option<String>,
}

impl CallbackParams {
    /// Read the parameters from a full redirect URL.
    pub fn from_redirect_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Result of [`AuthorizationFlow::news`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsPage {
    Feed {
        profile: UserProfile,
        articles: Vec<NewsArticle>,
    },
    /// No usable token; the user must link the account again.
    Reauthorize,
}

/// Controller driving the linking flow for request handlers.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use newstler::auth::{FileCredentialStore, MemorySessionStore};
/// use newstler::config::ServiceConfig;
/// use newstler::flow::{AuthorizationFlow, FlowStep};
/// use newstler::registry::ConfigDrivenRegistry;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServiceConfig::load(None)?;
/// let credentials = Arc::new(FileCredentialStore::new(config.storage.credentials_dir()));
/// let flow = AuthorizationFlow::new(Arc::new(ConfigDrivenRegistry::new(config)?), credentials);
///
/// let session = MemorySessionStore::new();
/// if let FlowStep::Authorize { authorization_url } = flow.start("42", &session).await? {
///     println!("visit {authorization_url}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthorizationFlow {
    registry: Arc<dyn ServiceRegistry>,
    credentials: Arc<dyn CredentialStore>,
}

impl AuthorizationFlow {
    pub fn new(registry: Arc<dyn ServiceRegistry>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            registry,
            credentials,
        }
    }

    /// Where `user_id` currently is in the flow.
    pub fn flow_state(
        &self,
        user_id: &str,
        session: &dyn SessionStore,
    ) -> Result<FlowState, FlowError> {
        if self.linked_token(user_id)?.is_some() {
            Ok(FlowState::TokenObtained)
        } else if session.get(STATE_SESSION_KEY).is_some() {
            Ok(FlowState::AwaitingCallback)
        } else {
            Ok(FlowState::NoToken)
        }
    }

    /// Entry point of the home page.
    ///
    /// Users without a token get a fresh authorization URL; its state is
    /// stored in `session` before this returns, replacing any earlier one.
    pub async fn start(
        &self,
        user_id: &str,
        session: &dyn SessionStore,
    ) -> Result<FlowStep, FlowError> {
        if self.linked_token(user_id)?.is_some() {
            debug!(user_id = %user_id, "linkedin account already linked");
            return Ok(FlowStep::Linked);
        }

        let linkedin = self.registry.linkedin().await?;
        let request = linkedin.build_authorization_request();
        session.put(STATE_SESSION_KEY, request.state);
        info!(
            user_id = %user_id,
            provider = linkedin.provider_name(),
            "authorization requested"
        );
        Ok(FlowStep::Authorize {
            authorization_url: request.authorization_url,
        })
    }

    /// Handle the provider's redirect.
    ///
    /// The pending state is consumed whatever the outcome, so each state is
    /// accepted at most once. The token endpoint is only called after the
    /// callback matched.
    pub async fn complete(
        &self,
        user_id: &str,
        session: &dyn SessionStore,
        params: &CallbackParams,
    ) -> Result<StoredCredential, FlowError> {
        let expected_state = session.remove(STATE_SESSION_KEY);
        if let Some(provider_error) = params.error.as_deref() {
            warn!(
                user_id = %user_id,
                provider_error = %provider_error,
                "linkedin returned an error to the callback"
            );
            return Err(FlowError::InvalidCallback);
        }
        let code = validate_callback(user_id, expected_state.as_deref(), params)?;

        let linkedin = self.registry.linkedin().await?;
        let token = linkedin.exchange_code_for_token(code).await?;
        let credential = StoredCredential::from_exchange(user_id, &token, Utc::now());
        self.credentials.save_credential(&credential)?;
        info!(
            user_id = %user_id,
            expires_at = ?credential.expires_at,
            "linkedin account linked"
        );
        Ok(credential)
    }

    /// Build the personalized feed.
    ///
    /// A token the provider refuses is cleared and [`NewsPage::Reauthorize`]
    /// is returned. Any other provider failure leaves the credential alone.
    pub async fn news(&self, user_id: &str) -> Result<NewsPage, FlowError> {
        let Some(access_token) = self.linked_token(user_id)? else {
            return Ok(NewsPage::Reauthorize);
        };

        let linkedin = self.registry.linkedin().await?;
        let session = linkedin.derive_session(&access_token);
        let profile = match session.fetch_profile().await {
            Ok(Some(profile)) => profile,
            Ok(None) => {
                self.credentials.clear_credential(user_id)?;
                info!(user_id = %user_id, "linkedin token invalidated; credential cleared");
                return Ok(NewsPage::Reauthorize);
            }
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "profile fetch failed");
                return Err(err.into());
            }
        };

        let storage = self.registry.news_storage().await?;
        let articles = storage.get_news_by_profile(&profile).await?;
        debug!(user_id = %user_id, articles = articles.len(), "news feed built");
        Ok(NewsPage::Feed { profile, articles })
    }

    /// Stored credential for `user_id`, if any.
    pub fn credential(&self, user_id: &str) -> Result<Option<StoredCredential>, FlowError> {
        Ok(self.credentials.load_credential(user_id)?)
    }

    /// Forget the user's token.
    pub fn unlink(&self, user_id: &str) -> Result<(), FlowError> {
        self.credentials.clear_credential(user_id)?;
        info!(user_id = %user_id, "linkedin account unlinked");
        Ok(())
    }

    fn linked_token(&self, user_id: &str) -> Result<Option<String>, FlowError> {
        Ok(self
            .credentials
            .load_credential(user_id)?
            .filter(StoredCredential::is_linked)
            .and_then(|credential| credential.access_token))
    }
}

/// Return the authorization code if the callback belongs to this session.
fn validate_callback<'a>(
    user_id: &str,
    expected_state: Option<&str>,
    params: &'a CallbackParams,
) -> Result<&'a str, NewstlerError> {
    let code = params.code.as_deref().filter(|c| !c.is_empty());
    let state = params
        .state
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let failure = match (code, state, expected_state) {
        (None, _, _) => "missing code",
        (_, None, _) => "missing state",
        (_, _, None) => "no pending authorization in session",
        (Some(code), Some(state), Some(expected)) if state == expected => return Ok(code),
        _ => "state mismatch",
    };
    debug!(user_id = %user_id, reason = failure, "authorization callback rejected");
    Err(NewstlerError::CallbackValidation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(code: Option<&str>, state: Option<&str>) -> CallbackParams {
        CallbackParams {
            code: code.map(str::to_string),
            state: state.map(str::to_string),
            error: None,
        }
    }

    #[test]
    fn matching_state_yields_code() {
        let p = params(Some("the-code"), Some("  abc \n"));
        assert_eq!(validate_callback("u", Some("abc"), &p).unwrap(), "the-code");
    }

    #[test]
    fn every_failed_check_is_the_same_error() {
        let cases = [
            (params(None, Some("abc")), Some("abc")),
            (params(Some(""), Some("abc")), Some("abc")),
            (params(Some("c"), None), Some("abc")),
            (params(Some("c"), Some("abc")), None),
            (params(Some("c"), Some("abd")), Some("abc")),
        ];
        for (p, expected) in cases {
            assert!(matches!(
                validate_callback("u", expected, &p),
                Err(NewstlerError::CallbackValidation)
            ));
        }
    }

    #[test]
    fn redirect_url_is_parsed() {
        let url = Url::parse("http://localhost:8000/linkedin/?code=xyz&state=s1&extra=1").unwrap();
        assert_eq!(
            CallbackParams::from_redirect_url(&url),
            CallbackParams {
                code: Some("xyz".to_string()),
                state: Some("s1".to_string()),
                error: None,
            }
        );
    }
}
