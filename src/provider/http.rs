//! Shared HTTP helpers for provider clients.

use std::time::Duration;

use reqwest::{StatusCode, Url};

use crate::error::{ConfigurationError, NewstlerError, Result};

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the HTTP client used by one provider client.
///
/// Whole-request deadlines are applied per call with
/// [`crate::util::timeout::with_timeout`].
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .pool_max_idle_per_host(10)
        .build()?;
    Ok(client)
}

/// Join `path` onto the origin of `base`, replacing any path and query.
pub fn endpoint_url(
    base: &str,
    path: &str,
    key: &str,
) -> std::result::Result<Url, ConfigurationError> {
    let mut url = Url::parse(base).map_err(|err| ConfigurationError::InvalidValue {
        key: key.to_string(),
        message: format!("`{base}` is not a valid URL: {err}"),
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigurationError::InvalidValue {
            key: key.to_string(),
            message: format!("`{base}` cannot be used as a base URL"),
        });
    }
    url.set_path(path);
    url.set_query(None);
    Ok(url)
}

/// Fail with a protocol error unless `status` is one of `expected`.
pub fn expect_status(status: StatusCode, expected: &[StatusCode], endpoint: &str) -> Result<()> {
    if expected.contains(&status) {
        return Ok(());
    }
    let expected = expected
        .iter()
        .map(|code| code.as_u16().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(NewstlerError::protocol(
        status.as_u16(),
        format!("unexpected response code from {endpoint} endpoint, expected one of [{expected}]"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_replaces_path_and_query() {
        let url = endpoint_url("https://www.linkedin.com/ignored?x=1", "/oauth/v2/authorization", "url")
            .unwrap();
        assert_eq!(url.as_str(), "https://www.linkedin.com/oauth/v2/authorization");
    }

    #[test]
    fn endpoint_url_rejects_garbage() {
        let result = endpoint_url("not a url", "/token", "url");
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { ref key, .. }) if key == "url"
        ));
    }

    #[test]
    fn unexpected_status_names_whitelist() {
        let err = expect_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            &[StatusCode::OK, StatusCode::FORBIDDEN],
            "profile",
        )
        .unwrap_err();
        match err {
            NewstlerError::Protocol { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("[200, 403]"));
            }
            other => panic!("expected Protocol, got {other:?}"),
        }
    }
}
