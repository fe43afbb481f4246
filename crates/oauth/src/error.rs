use std::path::PathBuf;

pub type AuthResult<T> = Result<T, AuthError>;

/// Failure classification for the credential lifecycle.
///
/// Resolution-step failures (unreadable or unparseable candidate files) are
/// never surfaced here; the resolver silently moves on to the next source.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No readable, parseable credential source was found.
    #[error("no credentials found for {provider}")]
    NoCredentials { provider: String },

    /// The stored credentials carry no refresh token; re-authentication is
    /// required through the provider's own login flow.
    #[error("stored credentials have no refresh token")]
    NoRefreshToken,

    /// The token endpoint did not answer within the refresh timeout.
    #[error("token endpoint timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The request could not be carried out (DNS, TLS, connection reset).
    #[error("token endpoint request failed")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    /// The provider rejected the refresh grant.
    #[error("token refresh rejected: {message}")]
    OAuth { message: String },

    /// The endpoint reported success but the body was unusable.
    #[error("token endpoint returned an unusable response: {reason}")]
    MalformedResponse { reason: String },

    /// Persisting refreshed credentials failed. The refresh itself succeeded;
    /// the in-flight tokens are still returned to the caller.
    #[error("failed to persist credentials to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuthError {
    pub fn no_credentials(provider: &str) -> Self {
        AuthError::NoCredentials {
            provider: provider.to_string(),
        }
    }

    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        AuthError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}
