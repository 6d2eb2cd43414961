//! LinkedIn REST client (OAuth2 authorization-code grant + profile API).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bon::Builder;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::http::{build_client, endpoint_url, expect_status};
use super::{ProviderClient, ProviderSession};
use crate::auth::types::generate_state;
use crate::auth::{AccessTokenResult, AuthorizationRequest, UserProfile};
use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{NewstlerError, Result};
use crate::util::timeout::with_timeout;

const PROFILE_PATH: &str = "/v1/people/~:(first-name,positions)";

/// 400/401 carry an OAuth `error` body for rejected codes.
const TOKEN_STATUSES: &[StatusCode] = &[
    StatusCode::OK,
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
];

/// 401/403 mean the token is no longer accepted.
const PROFILE_STATUSES: &[StatusCode] = &[
    StatusCode::OK,
    StatusCode::FORBIDDEN,
    StatusCode::UNAUTHORIZED,
];

/// Resolved connection settings for [`RestLinkedInClient`].
///
/// # Example
/// ```
/// use newstler::provider::LinkedInSettings;
///
/// let settings = LinkedInSettings::builder()
///     .base_url("https://www.linkedin.com")
///     .client_id("client")
///     .client_secret("secret")
///     .redirect_uri("http://localhost:8000/linkedin/")
///     .auth_path("/oauth/v2/authorization")
///     .token_path("/oauth/v2/accessToken")
///     .api_url("https://api.linkedin.com")
///     .build();
/// assert_eq!(settings.timeout.as_secs(), 30);
/// ```
#[derive(Clone, Builder)]
pub struct LinkedInSettings {
    #[builder(into)]
    pub base_url: String,
    #[builder(into)]
    pub client_id: String,
    #[builder(into)]
    pub client_secret: String,
    #[builder(into)]
    pub redirect_uri: String,
    #[builder(into)]
    pub auth_path: String,
    #[builder(into)]
    pub token_path: String,
    #[builder(into)]
    pub api_url: String,
    #[builder(default = Duration::from_secs(DEFAULT_TIMEOUT_SECS))]
    pub timeout: Duration,
}

impl fmt::Debug for LinkedInSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedInSettings")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"..")
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_path", &self.auth_path)
            .field("token_path", &self.token_path)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// LinkedIn OAuth2 client.
///
/// # Example
/// ```no_run
/// use newstler::provider::{LinkedInSettings, ProviderClient, RestLinkedInClient};
///
/// # async fn example(settings: LinkedInSettings) -> newstler::error::Result<()> {
/// let client = RestLinkedInClient::new(settings)?;
/// let request = client.build_authorization_request();
/// println!("visit {}", request.authorization_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RestLinkedInClient {
    http: reqwest::Client,
    settings: LinkedInSettings,
    authorize_url: Url,
    token_url: Url,
    profile_url: Url,
}

impl RestLinkedInClient {
    pub fn new(settings: LinkedInSettings) -> Result<Self> {
        let authorize_url = endpoint_url(&settings.base_url, &settings.auth_path, "url")?;
        let token_url = endpoint_url(&settings.base_url, &settings.token_path, "url")?;
        let mut profile_url = endpoint_url(&settings.api_url, PROFILE_PATH, "api-url")?;
        profile_url.query_pairs_mut().append_pair("format", "json");

        Ok(Self {
            http: build_client(settings.timeout)?,
            settings,
            authorize_url,
            token_url,
            profile_url,
        })
    }

    pub fn settings(&self) -> &LinkedInSettings {
        &self.settings
    }

    async fn request_token(&self, auth_code: &str) -> Result<AccessTokenResult> {
        let response = self
            .http
            .post(self.token_url.clone())
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", auth_code),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        expect_status(status, TOKEN_STATUSES, "token")?;
        let body = response.text().await?;
        let payload: TokenEndpointResponse = serde_json::from_str(&body).map_err(|err| {
            NewstlerError::protocol(status.as_u16(), format!("malformed token response: {err}"))
        })?;

        if let Some(error) = payload.error {
            warn!(
                status = status.as_u16(),
                error = %error,
                "linkedin rejected authorization code"
            );
            return Err(NewstlerError::ProviderRejected {
                error,
                description: payload.error_description,
            });
        }
        if status != StatusCode::OK {
            return Err(NewstlerError::protocol(
                status.as_u16(),
                "token endpoint failed without an error body",
            ));
        }

        match (payload.access_token, payload.expires_in) {
            (Some(_), Some(expires_in)) if expires_in < 0 => Err(NewstlerError::protocol(
                status.as_u16(),
                format!("token response has negative expires_in ({expires_in})"),
            )),
            (Some(access_token), Some(expires_in)) if !access_token.is_empty() => {
                debug!(expires_in, "linkedin access token issued");
                Ok(AccessTokenResult {
                    access_token,
                    expires_in,
                })
            }
            _ => Err(NewstlerError::protocol(
                status.as_u16(),
                "token response is missing access_token or expires_in",
            )),
        }
    }
}

#[async_trait]
impl ProviderClient for RestLinkedInClient {
    fn provider_name(&self) -> &str {
        "linkedin"
    }

    fn build_authorization_request(&self) -> AuthorizationRequest {
        let state = generate_state();
        let mut authorization_url = self.authorize_url.clone();
        authorization_url
            .query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("state", &state);
        AuthorizationRequest {
            state,
            authorization_url,
        }
    }

    async fn exchange_code_for_token(&self, auth_code: &str) -> Result<AccessTokenResult> {
        with_timeout(self.settings.timeout, self.request_token(auth_code)).await
    }

    fn derive_session(&self, access_token: &str) -> Box<dyn ProviderSession> {
        Box::new(LinkedInSession {
            http: self.http.clone(),
            profile_url: self.profile_url.clone(),
            access_token: access_token.to_string(),
            timeout: self.settings.timeout,
        })
    }
}

/// Token-bound LinkedIn session.
pub struct LinkedInSession {
    http: reqwest::Client,
    profile_url: Url,
    access_token: String,
    timeout: Duration,
}

impl fmt::Debug for LinkedInSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedInSession")
            .field("profile_url", &self.profile_url)
            .field("access_token", &"..")
            .finish()
    }
}

impl LinkedInSession {
    async fn request_profile(&self) -> Result<Option<UserProfile>> {
        let response = self
            .http
            .get(self.profile_url.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        expect_status(status, PROFILE_STATUSES, "profile")?;
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            debug!(status = status.as_u16(), "linkedin refused access token");
            return Ok(None);
        }

        let body = response.text().await?;
        let payload: ProfileResponse = serde_json::from_str(&body).map_err(|err| {
            NewstlerError::protocol(status.as_u16(), format!("malformed profile response: {err}"))
        })?;
        Ok(Some(payload.into_profile()))
    }
}

#[async_trait]
impl ProviderSession for LinkedInSession {
    async fn fetch_profile(&self) -> Result<Option<UserProfile>> {
        with_timeout(self.timeout, self.request_profile()).await
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(rename = "firstName")]
    first_name: String,
    positions: Option<PositionList>,
}

#[derive(Debug, Deserialize)]
struct PositionList {
    #[serde(default)]
    values: Vec<Position>,
}

#[derive(Debug, Deserialize)]
struct Position {
    title: Option<String>,
}

impl ProfileResponse {
    fn into_profile(self) -> UserProfile {
        let position = self
            .positions
            .and_then(|list| list.values.into_iter().next())
            .and_then(|first| first.title);
        UserProfile {
            display_name: self.first_name,
            position,
        }
    }
}
