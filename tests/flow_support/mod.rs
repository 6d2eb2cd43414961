#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::{Duration, Utc};
use newstler::auth::{CredentialStore, StoredCredential};
use newstler::config::ServiceConfig;
use newstler::error::NewstlerError;
use newstler::provider::LinkedInSettings;

pub const CLIENT_ID: &str = "client-123";
pub const CLIENT_SECRET: &str = "shh-secret";
pub const REDIRECT_URI: &str = "http://localhost:8000/linkedin/";
pub const AUTH_PATH: &str = "/oauth/v2/authorization";
pub const TOKEN_PATH: &str = "/oauth/v2/accessToken";
pub const PROFILE_PATH: &str = "/v1/people/~:(first-name,positions)";

#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: Mutex<HashMap<String, StoredCredential>>,
    saves: AtomicUsize,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, credential: StoredCredential) {
        self.credentials
            .lock()
            .expect("store lock poisoned")
            .insert(credential.owning_user_id.clone(), credential);
    }

    pub fn get(&self, user_id: &str) -> Option<StoredCredential> {
        self.credentials
            .lock()
            .expect("store lock poisoned")
            .get(user_id)
            .cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load_credential(&self, user_id: &str) -> Result<Option<StoredCredential>, NewstlerError> {
        Ok(self.get(user_id))
    }

    fn save_credential(&self, credential: &StoredCredential) -> Result<(), NewstlerError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.seed(credential.clone());
        Ok(())
    }
}

pub fn linked_credential(user_id: &str, access_token: &str) -> StoredCredential {
    StoredCredential {
        owning_user_id: user_id.to_string(),
        access_token: Some(access_token.to_string()),
        expires_at: Some(Utc::now() + Duration::hours(1)),
    }
}

/// Settings pointing both the OAuth host and the API host at `server_uri`.
pub fn settings(server_uri: &str) -> LinkedInSettings {
    LinkedInSettings::builder()
        .base_url(server_uri)
        .client_id(CLIENT_ID)
        .client_secret(CLIENT_SECRET)
        .redirect_uri(REDIRECT_URI)
        .auth_path(AUTH_PATH)
        .token_path(TOKEN_PATH)
        .api_url(server_uri)
        .timeout(std::time::Duration::from_secs(5))
        .build()
}

pub fn service_config(server_uri: &str) -> ServiceConfig {
    let raw = format!(
        r#"
        [linkedin]
        url = "{server_uri}"
        client-id = "{CLIENT_ID}"
        client-secret = "{CLIENT_SECRET}"
        redirect-uri = "{REDIRECT_URI}"
        auth-path = "{AUTH_PATH}"
        token-endpoint = "{TOKEN_PATH}"
        api-url = "{server_uri}"
        timeout-secs = 5
        "#
    );
    ServiceConfig::from_toml_str(&raw).expect("valid test config")
}
