/// Config schema for `gembox.toml`.

use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GemboxConfig {
    pub accounts: AccountsConfig,
    pub oauth: OauthConfig,
}

/// Managed account store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Override the managed account store directory.
    /// Defaults to `<config dir>/accounts`.
    pub dir: Option<PathBuf>,
}

/// OAuth overrides keyed by provider name (known key: "gemini").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OauthConfig {
    #[serde(flatten)]
    pub providers: HashMap<String, OauthProviderOverride>,
}

/// Per-provider OAuth overrides. Unset fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OauthProviderOverride {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: Option<String>,
    /// Override the provider CLI's own credential file location.
    pub legacy_credentials: Option<PathBuf>,
}

impl OauthConfig {
    pub fn provider(&self, name: &str) -> Option<&OauthProviderOverride> {
        self.providers.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_parses_to_defaults() {
        let cfg: GemboxConfig = toml::from_str("").unwrap();
        assert!(cfg.accounts.dir.is_none());
        assert!(cfg.oauth.providers.is_empty());
    }

    #[test]
    fn oauth_overrides_are_keyed_by_provider() {
        let cfg: GemboxConfig = toml::from_str(
            r#"
            [accounts]
            dir = "/tmp/accounts"

            [oauth.gemini]
            client_id = "custom-id"
            token_url = "https://example.test/token"
            "#,
        )
        .unwrap();

        assert_eq!(
            cfg.accounts.dir.as_deref(),
            Some(std::path::Path::new("/tmp/accounts"))
        );
        let gemini = cfg.oauth.provider("gemini").unwrap();
        assert_eq!(gemini.client_id.as_deref(), Some("custom-id"));
        assert_eq!(
            gemini.token_url.as_deref(),
            Some("https://example.test/token")
        );
        assert!(gemini.client_secret.is_none());
    }
}
