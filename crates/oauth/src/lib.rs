pub mod defaults;
pub mod error;
pub mod lifecycle;
pub mod refresh;
pub mod resolver;
pub mod storage;
pub mod types;

pub use {
    defaults::{ProviderConfig, gemini_config},
    error::{AuthError, AuthResult},
    lifecycle::{EXPIRY_LEAD_TIME_MS, EnsureOutcome, TokenLifecycle, needs_refresh},
    refresh::{REFRESH_TIMEOUT, RefreshClient},
    resolver::{AccountDirectory, ResolvedCredentials, SourceResolver},
    storage::write_back,
    types::{
        AccountEntry, CredentialRecord, LegacyCredentialFile, RefreshedTokens, SourceKind,
        TokenSource, mask_token, now_unix_ms, serialize_option_secret, serialize_secret,
    },
};
