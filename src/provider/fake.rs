//! Offline stand-in for LinkedIn used during development.
//!
//! Not a test double: it lets the whole flow run without provider access.
//! Its canned values carry no compatibility promise.

use async_trait::async_trait;
use reqwest::Url;

use super::{ProviderClient, ProviderSession};
use crate::auth::types::generate_state;
use crate::auth::{AccessTokenResult, AuthorizationRequest, UserProfile};
use crate::error::{ConfigurationError, Result};

const FAKE_AUTHORIZE_URL: &str = "http://fakelinkedin.com/authorize";
const FAKE_EXPIRES_IN: i64 = 11260;

/// LinkedIn client that never touches the network.
#[derive(Debug, Clone)]
pub struct FakeLinkedInClient {
    authorize_url: Url,
    profile: UserProfile,
}

impl FakeLinkedInClient {
    pub fn new() -> Result<Self> {
        let authorize_url =
            Url::parse(FAKE_AUTHORIZE_URL).map_err(|err| ConfigurationError::InvalidValue {
                key: "fake authorize url".to_string(),
                message: err.to_string(),
            })?;
        Ok(Self {
            authorize_url,
            profile: UserProfile {
                display_name: "Fake User".to_string(),
                position: Some("JavaScript Developer".to_string()),
            },
        })
    }

    /// Replace the profile every session reports.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }
}

#[async_trait]
impl ProviderClient for FakeLinkedInClient {
    fn provider_name(&self) -> &str {
        "linkedin-fake"
    }

    fn build_authorization_request(&self) -> AuthorizationRequest {
        let state = generate_state();
        let mut authorization_url = self.authorize_url.clone();
        authorization_url.query_pairs_mut().append_pair("state", &state);
        AuthorizationRequest {
            state,
            authorization_url,
        }
    }

    async fn exchange_code_for_token(&self, _auth_code: &str) -> Result<AccessTokenResult> {
        Ok(AccessTokenResult {
            access_token: uuid::Uuid::new_v4().simple().to_string(),
            expires_in: FAKE_EXPIRES_IN,
        })
    }

    fn derive_session(&self, _access_token: &str) -> Box<dyn ProviderSession> {
        Box::new(FakeSession {
            profile: self.profile.clone(),
        })
    }
}

struct FakeSession {
    profile: UserProfile,
}

#[async_trait]
impl ProviderSession for FakeSession {
    async fn fetch_profile(&self) -> Result<Option<UserProfile>> {
        Ok(Some(self.profile.clone()))
    }
}
