use std::path::PathBuf;

use {
    secrecy::{ExposeSecret, SecretString},
    serde::{Deserialize, Serialize, Serializer},
};

/// Serialize a `SecretString` by exposing its value.
///
/// `secrecy` deliberately does not implement `Serialize`; credential files are
/// the one place tokens are allowed to leave memory.
pub fn serialize_secret<S: Serializer>(secret: &SecretString, ser: S) -> Result<S::Ok, S::Error> {
    ser.serialize_str(secret.expose_secret())
}

/// Serialize an optional `SecretString` by exposing its value.
pub fn serialize_option_secret<S: Serializer>(
    secret: &Option<SecretString>,
    ser: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(value) => ser.serialize_some(value.expose_secret()),
        None => ser.serialize_none(),
    }
}

/// Canonical in-memory credentials for one provider account.
///
/// Built fresh on every resolution; nothing is cached across calls.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub access_token: SecretString,
    /// Absent means refresh is impossible.
    pub refresh_token: Option<SecretString>,
    /// Absolute expiry, milliseconds since epoch. Absent means non-expiring.
    pub expiry: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub id_token: Option<SecretString>,
    /// Fields this tool does not interpret but must not lose on write-back.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CredentialRecord {
    /// Apply a successful refresh exchange. The provider is not guaranteed to
    /// rotate the refresh token; keep the previous one when it does not.
    pub fn apply_refresh(&mut self, refreshed: RefreshedTokens) {
        self.access_token = refreshed.access_token;
        self.expiry = Some(refreshed.expiry);
        if let Some(token) = refreshed.refresh_token {
            self.refresh_token = Some(token);
        }
        if let Some(token) = refreshed.id_token {
            self.id_token = Some(token);
        }
        if let Some(scope) = refreshed.scope {
            self.scope = Some(scope);
        }
        if let Some(token_type) = refreshed.token_type {
            self.token_type = Some(token_type);
        }
    }

    pub fn from_legacy(file: LegacyCredentialFile) -> Self {
        Self {
            access_token: file.access_token,
            refresh_token: file.refresh_token,
            expiry: file.expiry_date,
            scope: file.scope,
            token_type: file.token_type,
            id_token: file.id_token,
            extra: file.extra,
        }
    }

    pub fn to_legacy(&self) -> LegacyCredentialFile {
        LegacyCredentialFile {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            expiry_date: self.expiry,
            scope: self.scope.clone(),
            token_type: self.token_type.clone(),
            id_token: self.id_token.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// The provider CLI's own credential file, consumed and rewritten verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyCredentialFile {
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: SecretString,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<SecretString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub id_token: Option<SecretString>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Where a credential record was read from, and therefore where it is written
/// back. Threaded as an explicit value, never inferred at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSource {
    pub kind: SourceKind,
    /// The physical file that was actually read.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A per-account token file inside the managed store.
    ManagedStore,
    /// The provider CLI's well-known credential file.
    LegacyFile,
}

/// Success payload of a refresh exchange.
#[derive(Debug)]
pub struct RefreshedTokens {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    /// Absolute expiry, milliseconds since epoch.
    pub expiry: i64,
    pub id_token: Option<SecretString>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

/// One entry in the managed account directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Token file name inside the store root.
    pub token_file: String,
}

/// Milliseconds since the Unix epoch.
pub fn now_unix_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

const TOKEN_MASK_PREFIX_LEN: usize = 6;
const TOKEN_MASK_SUFFIX_LEN: usize = 4;

/// Shorten a token for display: `ya29.a...x4f2`.
pub fn mask_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let len = trimmed.len();
    if len <= TOKEN_MASK_PREFIX_LEN + TOKEN_MASK_SUFFIX_LEN {
        return "*".repeat(len.min(8));
    }
    let prefix = &trimmed[..TOKEN_MASK_PREFIX_LEN];
    let suffix = &trimmed[len - TOKEN_MASK_SUFFIX_LEN..];
    format!("{prefix}...{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string())
    }

    #[test]
    fn legacy_file_round_trip_preserves_unknown_fields() {
        let raw = r#"{
            "access_token": "ya29.abc",
            "refresh_token": "1//r",
            "expiry_date": 1768126811935,
            "scope": "cloud-platform",
            "token_type": "Bearer",
            "id_token": "eyJ.x",
            "quota_project": "my-project"
        }"#;

        let file: LegacyCredentialFile = serde_json::from_str(raw).unwrap();
        assert_eq!(file.extra.get("quota_project").unwrap(), "my-project");

        let out = serde_json::to_value(&file).unwrap();
        assert_eq!(out["access_token"], "ya29.abc");
        assert_eq!(out["refresh_token"], "1//r");
        assert_eq!(out["expiry_date"], 1768126811935_i64);
        assert_eq!(out["quota_project"], "my-project");
    }

    #[test]
    fn legacy_file_without_optional_fields_parses() {
        let file: LegacyCredentialFile =
            serde_json::from_str(r#"{"access_token": "ya29.only"}"#).unwrap();
        assert!(file.refresh_token.is_none());
        assert!(file.expiry_date.is_none());

        let out = serde_json::to_value(&file).unwrap();
        assert!(out.get("refresh_token").is_none());
        assert!(out.get("expiry_date").is_none());
    }

    #[test]
    fn apply_refresh_keeps_prior_refresh_token_when_not_rotated() {
        let mut record = CredentialRecord {
            access_token: secret("old"),
            refresh_token: Some(secret("keep-me")),
            expiry: Some(1),
            scope: None,
            token_type: Some("Bearer".into()),
            id_token: None,
            extra: serde_json::Map::new(),
        };

        record.apply_refresh(RefreshedTokens {
            access_token: secret("new"),
            refresh_token: None,
            expiry: 99,
            id_token: None,
            scope: None,
            token_type: None,
        });

        assert_eq!(record.access_token.expose_secret(), "new");
        assert_eq!(record.refresh_token.unwrap().expose_secret(), "keep-me");
        assert_eq!(record.expiry, Some(99));
        assert_eq!(record.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn apply_refresh_takes_rotated_refresh_token() {
        let mut record = CredentialRecord {
            access_token: secret("old"),
            refresh_token: Some(secret("stale")),
            expiry: None,
            scope: None,
            token_type: None,
            id_token: None,
            extra: serde_json::Map::new(),
        };

        record.apply_refresh(RefreshedTokens {
            access_token: secret("new"),
            refresh_token: Some(secret("rotated")),
            expiry: 5,
            id_token: None,
            scope: None,
            token_type: None,
        });

        assert_eq!(record.refresh_token.unwrap().expose_secret(), "rotated");
    }

    #[test]
    fn debug_output_never_contains_token_material() {
        let record = CredentialRecord {
            access_token: secret("ya29.secret-value"),
            refresh_token: Some(secret("1//01refresh")),
            expiry: Some(0),
            scope: None,
            token_type: None,
            id_token: None,
            extra: serde_json::Map::new(),
        };
        let debug = format!("{record:?}");
        assert!(!debug.contains("ya29.secret-value"));
        assert!(!debug.contains("1//01refresh"));
    }

    #[test]
    fn mask_token_keeps_prefix_and_suffix() {
        assert_eq!(mask_token("abcdef1234567890"), "abcdef...7890");
        assert_eq!(mask_token("abcd"), "****");
        assert_eq!(mask_token(""), "");
    }
}
