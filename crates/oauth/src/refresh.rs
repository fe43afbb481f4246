//! Refresh-token grant exchange against the provider's token endpoint.

use std::time::Duration;

use {
    reqwest::StatusCode,
    secrecy::{ExposeSecret, SecretString},
    serde_json::Value,
    tracing::debug,
};

use crate::{
    defaults::ProviderConfig,
    error::{AuthError, AuthResult},
    types::{RefreshedTokens, now_unix_ms},
};

/// Hard bound on the token-endpoint round trip. Exceeding it aborts the
/// in-flight request.
pub const REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifetime assumed when the provider omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Client for the `grant_type=refresh_token` exchange.
pub struct RefreshClient {
    provider: ProviderConfig,
    http: reqwest::Client,
}

impl RefreshClient {
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            http: reqwest::Client::new(),
        }
    }

    /// Exchange `refresh_token` for a fresh access token.
    ///
    /// The new expiry is computed locally as `now + expires_in`; the provider
    /// may or may not rotate the refresh token.
    pub async fn refresh(&self, refresh_token: &SecretString) -> AuthResult<RefreshedTokens> {
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret().as_str()),
            ("client_id", self.provider.client_id.as_str()),
        ];
        if let Some(secret) = self.provider.client_secret.as_deref().filter(|s| !s.is_empty()) {
            form.push(("client_secret", secret));
        }

        debug!(provider = %self.provider.name, "refreshing access token");
        let response = self
            .http
            .post(self.provider.token_url.as_str())
            .timeout(REFRESH_TIMEOUT)
            .form(&form)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(classify_transport)?;
        parse_token_body(status, &body, now_unix_ms())
    }
}

fn classify_transport(source: reqwest::Error) -> AuthError {
    if source.is_timeout() {
        AuthError::Timeout {
            timeout_secs: REFRESH_TIMEOUT.as_secs(),
        }
    } else {
        AuthError::Network {
            source,
        }
    }
}

/// Interpret a token-endpoint response.
///
/// A non-success status or an explicit `error` field is an OAuth rejection;
/// a success response without an access token is malformed.
fn parse_token_body(status: StatusCode, body: &str, now_ms: i64) -> AuthResult<RefreshedTokens> {
    let value: Option<Value> = serde_json::from_str(body).ok();

    let has_error_field = value.as_ref().is_some_and(|v| v.get("error").is_some());
    if !status.is_success() || has_error_field {
        let message = value
            .as_ref()
            .and_then(oauth_error_message)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(AuthError::OAuth {
            message,
        });
    }

    let Some(value) = value else {
        return Err(AuthError::MalformedResponse {
            reason: "body is not JSON".into(),
        });
    };

    let Some(access_token) = non_empty_str(&value, "access_token") else {
        return Err(AuthError::MalformedResponse {
            reason: "response carries no access_token".into(),
        });
    };

    let expires_in = value
        .get("expires_in")
        .and_then(parse_i64_lossy)
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

    Ok(RefreshedTokens {
        access_token: SecretString::new(access_token.to_string()),
        refresh_token: non_empty_str(&value, "refresh_token")
            .map(|v| SecretString::new(v.to_string())),
        expiry: now_ms.saturating_add(expires_in.saturating_mul(1000)),
        id_token: non_empty_str(&value, "id_token").map(|v| SecretString::new(v.to_string())),
        scope: non_empty_str(&value, "scope").map(str::to_string),
        token_type: non_empty_str(&value, "token_type").map(str::to_string),
    })
}

/// `error_description` when present, else the `error` code.
fn oauth_error_message(value: &Value) -> Option<String> {
    if let Some(description) = non_empty_str(value, "error_description") {
        return Some(description.to_string());
    }
    non_empty_str(value, "error").map(str::to_string)
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// `expires_in` arrives as a number from most providers but as a string from
/// some proxies.
fn parse_i64_lossy(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
