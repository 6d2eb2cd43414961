//! OAuth provider clients.
//!
//! A [`ProviderClient`] runs the unauthenticated half of the authorization-code
//! flow. Profile data is only reachable through a [`ProviderSession`], which
//! is derived from a client plus an access token, so an unbound client can
//! never be used to make an authenticated call.

pub mod fake;
pub mod http;
pub mod linkedin;

pub use fake::FakeLinkedInClient;
pub use linkedin::{LinkedInSettings, RestLinkedInClient};

use async_trait::async_trait;

use crate::auth::{AccessTokenResult, AuthorizationRequest, UserProfile};
use crate::error::Result;

/// Unauthenticated OAuth2 client for the profile provider.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Short provider name used in logs.
    fn provider_name(&self) -> &str;

    /// Create a fresh anti-forgery state and the authorization URL carrying it.
    fn build_authorization_request(&self) -> AuthorizationRequest;

    /// Exchange a single-use authorization code for an access token.
    ///
    /// Never retried: the code is consumed by the first attempt.
    async fn exchange_code_for_token(&self, auth_code: &str) -> Result<AccessTokenResult>;

    /// Bind an access token, returning an independent session value.
    fn derive_session(&self, access_token: &str) -> Box<dyn ProviderSession>;
}

/// Token-bound view of a provider client.
#[async_trait]
pub trait ProviderSession: Send + Sync {
    /// Fetch the user's profile.
    ///
    /// `Ok(None)` means the provider refused the token (expired or revoked);
    /// transport and unexpected-status failures are errors.
    async fn fetch_profile(&self) -> Result<Option<UserProfile>>;
}
