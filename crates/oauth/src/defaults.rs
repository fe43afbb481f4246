use std::path::PathBuf;

use gembox_config::GemboxConfig;

/// Static OAuth configuration for one provider.
///
/// The client id/secret are the provider-distributed public client of the
/// provider's own CLI, not user secrets; they ship as built-in defaults and
/// can be overridden per deployment.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Short provider name ("gemini"); also the managed-store filename prefix.
    pub name: String,
    /// Value of the `type` field that marks a managed token file as ours.
    pub tag: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    /// The provider CLI's own credential file (the legacy source).
    pub legacy_credentials: Option<PathBuf>,
}

impl ProviderConfig {
    /// Managed token files are named `<prefix><account>.json`.
    pub fn token_file_prefix(&self) -> String {
        format!("{}-", self.name)
    }
}

fn builtin_gemini() -> ProviderConfig {
    ProviderConfig {
        name: "gemini".into(),
        tag: "gemini_oauth".into(),
        token_url: "https://oauth2.googleapis.com/token".into(),
        client_id: "681255809395-oo8ft2oprdrnp9e3aqf6av3hmdib135j.apps.googleusercontent.com"
            .into(),
        client_secret: Some("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".into()),
        legacy_credentials: gembox_config::home_dir()
            .map(|h| h.join(".gemini").join("oauth_creds.json")),
    }
}

/// Build the Gemini provider config.
///
/// Priority:
/// 1. Environment variables (`GEMBOX_OAUTH_GEMINI_CLIENT_ID`, etc.)
/// 2. `[oauth.gemini]` in `gembox.toml`
/// 3. Built-in defaults
pub fn gemini_config(cfg: &GemboxConfig) -> ProviderConfig {
    let mut provider = builtin_gemini();

    if let Some(over) = cfg.oauth.provider(&provider.name) {
        if let Some(v) = &over.client_id {
            provider.client_id = v.clone();
        }
        if let Some(v) = &over.client_secret {
            provider.client_secret = Some(v.clone());
        }
        if let Some(v) = &over.token_url {
            provider.token_url = v.clone();
        }
        if let Some(v) = &over.legacy_credentials {
            provider.legacy_credentials = Some(v.clone());
        }
    }

    let env_prefix = format!("GEMBOX_OAUTH_{}_", provider.name.to_uppercase());
    if let Ok(v) = std::env::var(format!("{env_prefix}CLIENT_ID")) {
        provider.client_id = v;
    }
    if let Ok(v) = std::env::var(format!("{env_prefix}CLIENT_SECRET")) {
        provider.client_secret = Some(v);
    }
    if let Ok(v) = std::env::var(format!("{env_prefix}TOKEN_URL")) {
        provider.token_url = v;
    }

    provider
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_gemini_points_at_google_token_endpoint() {
        let provider = builtin_gemini();
        assert_eq!(provider.token_url, "https://oauth2.googleapis.com/token");
        assert!(provider.client_id.ends_with(".apps.googleusercontent.com"));
        assert!(provider.client_secret.is_some());
        assert_eq!(provider.token_file_prefix(), "gemini-");
    }

    #[test]
    fn config_file_overrides_builtin_defaults() {
        let mut cfg = GemboxConfig::default();
        cfg.oauth.providers.insert(
            "gemini".into(),
            gembox_config::OauthProviderOverride {
                client_id: Some("test-client".into()),
                client_secret: None,
                token_url: Some("http://127.0.0.1:9/token".into()),
                legacy_credentials: Some("/tmp/oauth_creds.json".into()),
            },
        );

        let provider = gemini_config(&cfg);
        assert_eq!(provider.client_id, "test-client");
        assert_eq!(provider.token_url, "http://127.0.0.1:9/token");
        assert_eq!(
            provider.legacy_credentials.as_deref(),
            Some(std::path::Path::new("/tmp/oauth_creds.json"))
        );
        // Untouched fields keep their builtin values.
        assert_eq!(provider.tag, "gemini_oauth");
        assert!(provider.client_secret.is_some());
    }
}
