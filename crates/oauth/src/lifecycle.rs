//! "Ensure the token is valid": resolve, evaluate, refresh, persist.

use {
    secrecy::ExposeSecret,
    tracing::{debug, info, warn},
};

use crate::{
    defaults::ProviderConfig,
    error::{AuthError, AuthResult},
    refresh::RefreshClient,
    resolver::{AccountDirectory, ResolvedCredentials, SourceResolver},
    storage,
    types::{CredentialRecord, TokenSource, now_unix_ms},
};

/// Refresh this long before the token actually expires.
pub const EXPIRY_LEAD_TIME_MS: i64 = 5 * 60 * 1000;

/// Whether the access token must be refreshed before use.
///
/// A record without an expiry is trusted as non-expiring; that is a trust
/// decision, not a validation against the provider.
pub fn needs_refresh(record: &CredentialRecord, now_ms: i64) -> bool {
    if record.access_token.expose_secret().is_empty() {
        return true;
    }
    match record.expiry {
        Some(expiry) => expiry.saturating_sub(now_ms) < EXPIRY_LEAD_TIME_MS,
        None => false,
    }
}

/// Result of an orchestrated lifecycle operation.
#[derive(Debug)]
pub struct EnsureOutcome {
    pub credentials: CredentialRecord,
    pub source: TokenSource,
    pub refreshed: bool,
    /// Set when refreshed credentials could not be persisted. The tokens in
    /// `credentials` are still the fresh ones from the exchange.
    pub write_error: Option<AuthError>,
}

/// Composes resolution, expiry evaluation, refresh and write-back.
pub struct TokenLifecycle<'a> {
    provider: &'a ProviderConfig,
    directory: &'a dyn AccountDirectory,
    client: RefreshClient,
}

impl<'a> TokenLifecycle<'a> {
    pub fn new(provider: &'a ProviderConfig, directory: &'a dyn AccountDirectory) -> Self {
        Self {
            provider,
            directory,
            client: RefreshClient::new(provider.clone()),
        }
    }

    /// Make sure a usable access token exists, refreshing and persisting it
    /// when it is about to expire.
    ///
    /// A failed refresh is terminal: the stale token is never reported as
    /// usable just because the exchange failed.
    pub async fn ensure_valid(&self) -> AuthResult<EnsureOutcome> {
        let resolved = self.resolve()?;
        if !needs_refresh(&resolved.record, now_unix_ms()) {
            debug!(path = %resolved.source.path.display(), "access token still valid");
            return Ok(EnsureOutcome {
                credentials: resolved.record,
                source: resolved.source,
                refreshed: false,
                write_error: None,
            });
        }
        self.refresh_and_persist(resolved).await
    }

    /// Refresh unconditionally.
    ///
    /// Re-resolves credentials (one the caller did earlier may no longer be
    /// current) and fails fast without a refresh token.
    pub async fn refresh_now(&self) -> AuthResult<EnsureOutcome> {
        let resolved = self.resolve()?;
        self.refresh_and_persist(resolved).await
    }

    fn resolve(&self) -> AuthResult<ResolvedCredentials> {
        let resolved = SourceResolver::new(self.provider, self.directory)
            .resolve()
            .ok_or_else(|| AuthError::no_credentials(&self.provider.name))?;
        if resolved.record.access_token.expose_secret().is_empty() {
            return Err(AuthError::no_credentials(&self.provider.name));
        }
        Ok(resolved)
    }

    async fn refresh_and_persist(&self, resolved: ResolvedCredentials) -> AuthResult<EnsureOutcome> {
        let ResolvedCredentials {
            mut record,
            source,
        } = resolved;
        let Some(refresh_token) = record.refresh_token.clone() else {
            return Err(AuthError::NoRefreshToken);
        };

        let refreshed = self.client.refresh(&refresh_token).await?;
        record.apply_refresh(refreshed);
        info!(path = %source.path.display(), "access token refreshed");

        let write_error = storage::write_back(&source, &record).err();
        if let Some(err) = &write_error {
            warn!(error = %err, "refreshed token could not be persisted");
        }
        Ok(EnsureOutcome {
            credentials: record,
            source,
            refreshed: true,
            write_error,
        })
    }
}
