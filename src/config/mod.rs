//! Configuration system (layered: env > config file > defaults).
//!
//! The file is TOML with a `[linkedin]` section describing the OAuth provider
//! and a `[storage]` section for local persistence:
//!
//! ```toml
//! [linkedin]
//! disabled = false
//! url = "https://www.linkedin.com"
//! client-id = "client"
//! client-secret = "secret"
//! redirect-uri = "http://localhost:8000/linkedin/"
//! auth-path = "/oauth/v2/authorization"
//! token-endpoint = "/oauth/v2/accessToken"
//! api-url = "https://api.linkedin.com"
//!
//! [storage]
//! news-catalog = "news.toml"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, NewstlerError, Result};
use crate::provider::linkedin::LinkedInSettings;

/// Request timeout used when `timeout-secs` is not set.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Immutable service configuration, read once at process start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub linkedin: LinkedInConfig,
    pub storage: StorageConfig,
}

/// `[linkedin]` section. Every key except `disabled` is required unless the
/// fake provider is selected with `disabled = true`.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LinkedInConfig {
    pub disabled: bool,
    pub url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub auth_path: Option<String>,
    pub token_endpoint: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for LinkedInConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedInConfig")
            .field("disabled", &self.disabled)
            .field("url", &self.url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| ".."))
            .field("redirect_uri", &self.redirect_uri)
            .field("auth_path", &self.auth_path)
            .field("token_endpoint", &self.token_endpoint)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Directory holding one credential file per user.
    pub credentials_dir: Option<PathBuf>,
    /// TOML news catalog backing the news storage.
    pub news_catalog: Option<PathBuf>,
}

impl StorageConfig {
    pub fn credentials_dir(&self) -> PathBuf {
        self.credentials_dir
            .clone()
            .unwrap_or_else(|| default_newstler_dir().join("credentials"))
    }
}

impl LinkedInConfig {
    /// Resolve the settings for the REST client, failing on the first
    /// missing key.
    pub fn settings(&self) -> std::result::Result<LinkedInSettings, ConfigurationError> {
        Ok(LinkedInSettings::builder()
            .base_url(required(&self.url, "url")?)
            .client_id(required(&self.client_id, "client-id")?)
            .client_secret(required(&self.client_secret, "client-secret")?)
            .redirect_uri(required(&self.redirect_uri, "redirect-uri")?)
            .auth_path(required(&self.auth_path, "auth-path")?)
            .token_path(required(&self.token_endpoint, "token-endpoint")?)
            .api_url(required(&self.api_url, "api-url")?)
            .timeout(self.timeout())
            .build())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

impl ServiceConfig {
    /// Default config file path (~/.newstler/config.toml).
    pub fn default_path() -> PathBuf {
        default_newstler_dir().join(CONFIG_FILE_NAME)
    }

    /// Parse a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| {
            ConfigurationError::Other(format!("invalid config file: {err}")).into()
        })
    }

    /// Load configuration from `path` (or the default location), then apply
    /// `NEWSTLER_*` environment overrides and validate.
    ///
    /// An explicit path must exist; a missing default file yields an empty
    /// configuration that only passes validation through env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let mut config = match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?)?,
            None => match std::fs::read_to_string(Self::default_path()) {
                Ok(raw) => Self::from_toml_str(&raw)?,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::default(),
                Err(err) => return Err(NewstlerError::Io(err)),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        tracing::debug!(
            fake_provider = config.linkedin.disabled,
            "service configuration loaded"
        );
        Ok(config)
    }

    /// Override file values with variables found through `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<(), ConfigurationError> {
        let linkedin = &mut self.linkedin;
        let string_mappings: [(&str, &mut Option<String>); 7] = [
            ("NEWSTLER_LINKEDIN_URL", &mut linkedin.url),
            ("NEWSTLER_LINKEDIN_CLIENT_ID", &mut linkedin.client_id),
            ("NEWSTLER_LINKEDIN_CLIENT_SECRET", &mut linkedin.client_secret),
            ("NEWSTLER_LINKEDIN_REDIRECT_URI", &mut linkedin.redirect_uri),
            ("NEWSTLER_LINKEDIN_AUTH_PATH", &mut linkedin.auth_path),
            ("NEWSTLER_LINKEDIN_TOKEN_ENDPOINT", &mut linkedin.token_endpoint),
            ("NEWSTLER_LINKEDIN_API_URL", &mut linkedin.api_url),
        ];
        for (env_var, slot) in string_mappings {
            if let Some(value) = lookup(env_var) {
                *slot = Some(value);
            }
        }

        if let Some(value) = lookup("NEWSTLER_LINKEDIN_DISABLED") {
            linkedin.disabled = parse_bool("NEWSTLER_LINKEDIN_DISABLED", &value)?;
        }
        if let Some(value) = lookup("NEWSTLER_LINKEDIN_TIMEOUT_SECS") {
            let secs = value
                .trim()
                .parse::<u64>()
                .map_err(|err| ConfigurationError::InvalidValue {
                    key: "NEWSTLER_LINKEDIN_TIMEOUT_SECS".to_string(),
                    message: err.to_string(),
                })?;
            linkedin.timeout_secs = Some(secs);
        }

        if let Some(dir) = lookup("NEWSTLER_CREDENTIALS_DIR") {
            self.storage.credentials_dir = Some(PathBuf::from(dir));
        }
        if let Some(catalog) = lookup("NEWSTLER_NEWS_CATALOG") {
            self.storage.news_catalog = Some(PathBuf::from(catalog));
        }
        Ok(())
    }

    /// Check that every key the selected provider needs is present.
    pub fn validate(&self) -> std::result::Result<(), ConfigurationError> {
        if self.linkedin.disabled {
            return Ok(());
        }
        self.linkedin.settings().map(|_| ())
    }
}

fn required(
    value: &Option<String>,
    key: &'static str,
) -> std::result::Result<String, ConfigurationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigurationError::MissingKey {
            section: "linkedin",
            key,
        })
}

fn parse_bool(key: &str, value: &str) -> std::result::Result<bool, ConfigurationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigurationError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got `{other}`"),
        }),
    }
}

fn default_newstler_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".newstler"))
        .unwrap_or_else(|| PathBuf::from(".newstler"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const FULL_CONFIG: &str = r#"
        [linkedin]
        url = "https://www.linkedin.com"
        client-id = "client"
        client-secret = "secret"
        redirect-uri = "http://localhost:8000/linkedin/"
        auth-path = "/oauth/v2/authorization"
        token-endpoint = "/oauth/v2/accessToken"
        api-url = "https://api.linkedin.com"
        timeout-secs = 5
    "#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn full_linkedin_section_validates() {
        let config = ServiceConfig::from_toml_str(FULL_CONFIG).unwrap();
        assert!(!config.linkedin.disabled);
        config.validate().unwrap();
        let settings = config.linkedin.settings().unwrap();
        assert_eq!(settings.token_path, "/oauth/v2/accessToken");
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let raw = FULL_CONFIG.replace("client-secret = \"secret\"", "");
        let config = ServiceConfig::from_toml_str(&raw).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::MissingKey {
                section: "linkedin",
                key: "client-secret"
            })
        );
    }

    #[test]
    fn disabled_provider_needs_no_other_keys() {
        let config = ServiceConfig::from_toml_str("[linkedin]\ndisabled = true\n").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn env_overrides_take_precedence_over_file() {
        let mut config = ServiceConfig::from_toml_str(FULL_CONFIG).unwrap();
        config
            .apply_env_overrides(env(&[
                ("NEWSTLER_LINKEDIN_CLIENT_ID", "from-env"),
                ("NEWSTLER_LINKEDIN_DISABLED", "yes"),
                ("NEWSTLER_CREDENTIALS_DIR", "/var/lib/newstler"),
            ]))
            .unwrap();
        assert_eq!(config.linkedin.client_id.as_deref(), Some("from-env"));
        assert!(config.linkedin.disabled);
        assert_eq!(
            config.storage.credentials_dir(),
            PathBuf::from("/var/lib/newstler")
        );
    }

    #[test]
    fn malformed_bool_override_is_rejected() {
        let mut config = ServiceConfig::default();
        let result = config.apply_env_overrides(env(&[("NEWSTLER_LINKEDIN_DISABLED", "maybe")]));
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { ref key, .. }) if key == "NEWSTLER_LINKEDIN_DISABLED"
        ));
    }

    #[test]
    fn debug_output_redacts_client_secret() {
        let config = ServiceConfig::from_toml_str(FULL_CONFIG).unwrap();
        let rendered = format!("{:?}", config.linkedin);
        assert!(!rendered.contains("secret\""));
        assert!(rendered.contains("client_secret: Some(\"..\")"));
    }
}
