//! Credential source resolution: managed store first, legacy file last.

use std::path::{Path, PathBuf};

use {secrecy::SecretString, serde::Deserialize, tracing::debug};

use crate::{
    defaults::ProviderConfig,
    types::{AccountEntry, CredentialRecord, LegacyCredentialFile, SourceKind, TokenSource},
};

/// The managed account directory, maintained by the surrounding tool.
///
/// Resolution consumes this interface; it never walks account metadata itself.
pub trait AccountDirectory: Send + Sync {
    /// Managed-store root for the provider, if one exists.
    fn store_root(&self) -> Option<PathBuf>;

    /// The configured default account and its token-file name.
    fn default_account(&self) -> Option<AccountEntry>;

    /// All accounts of the provider, in listing order.
    fn list_accounts(&self) -> Vec<AccountEntry>;

    /// Whether an arbitrary file belongs to the provider.
    fn classify(&self, path: &Path) -> bool;
}

/// A credential record plus the physical location it came from.
#[derive(Debug)]
pub struct ResolvedCredentials {
    pub record: CredentialRecord,
    pub source: TokenSource,
}

/// Ordered resolution over the candidate credential locations.
///
/// Every step treats unreadable or unparseable candidates as "no candidate
/// here" and moves on; nothing short of full exhaustion reaches the caller.
pub struct SourceResolver<'a> {
    provider: &'a ProviderConfig,
    directory: &'a dyn AccountDirectory,
}

impl<'a> SourceResolver<'a> {
    pub fn new(provider: &'a ProviderConfig, directory: &'a dyn AccountDirectory) -> Self {
        Self {
            provider,
            directory,
        }
    }

    /// First hit wins; no merging across sources.
    pub fn resolve(&self) -> Option<ResolvedCredentials> {
        self.from_default_account()
            .or_else(|| self.from_first_listed_account())
            .or_else(|| self.from_store_scan())
            .or_else(|| self.from_legacy_file())
    }

    fn from_default_account(&self) -> Option<ResolvedCredentials> {
        let account = self.directory.default_account()?;
        let path = self.directory.store_root()?.join(&account.token_file);
        let resolved = self.read_managed(&path);
        if resolved.is_none() {
            debug!(account = %account.name, "default account token file did not qualify");
        }
        resolved
    }

    fn from_first_listed_account(&self) -> Option<ResolvedCredentials> {
        let root = self.directory.store_root()?;
        let account = self.directory.list_accounts().into_iter().next()?;
        self.read_managed(&root.join(&account.token_file))
    }

    /// Last managed-store resort: scan `*.json` files in the store root and
    /// take the first that is named for the provider or that the external
    /// classifier attributes to it.
    fn from_store_scan(&self) -> Option<ResolvedCredentials> {
        let root = self.directory.store_root()?;
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&root)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        candidates.sort();

        let prefix = self.provider.token_file_prefix();
        for path in candidates {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if !name.starts_with(&prefix) && !self.directory.classify(&path) {
                continue;
            }
            if let Some(resolved) = self.read_managed(&path) {
                return Some(resolved);
            }
        }
        None
    }

    fn from_legacy_file(&self) -> Option<ResolvedCredentials> {
        let path = self.provider.legacy_credentials.clone()?;
        let raw = std::fs::read_to_string(&path).ok()?;
        let file: LegacyCredentialFile = serde_json::from_str(&raw).ok()?;
        debug!(path = %path.display(), "resolved credentials from legacy file");
        Some(ResolvedCredentials {
            record: CredentialRecord::from_legacy(file),
            source: TokenSource {
                kind: SourceKind::LegacyFile,
                path,
            },
        })
    }

    /// A managed file qualifies only if it parses, carries the provider tag,
    /// and nests the token fields under `token`.
    fn read_managed(&self, path: &Path) -> Option<ResolvedCredentials> {
        let raw = std::fs::read_to_string(path).ok()?;
        let file: ManagedTokenFile = serde_json::from_str(&raw).ok()?;
        if file.kind != self.provider.tag {
            return None;
        }
        debug!(path = %path.display(), "resolved credentials from managed store");
        Some(ResolvedCredentials {
            record: CredentialRecord {
                access_token: file.token.access_token,
                refresh_token: file.token.refresh_token,
                expiry: file.token.expiry,
                scope: None,
                token_type: Some("Bearer".to_string()),
                id_token: None,
                extra: serde_json::Map::new(),
            },
            source: TokenSource {
                kind: SourceKind::ManagedStore,
                path: path.to_path_buf(),
            },
        })
    }
}

/// Shape of a managed-store token file. Sibling account fields (email,
/// project id) are not modeled here; the writer preserves them structurally.
#[derive(Deserialize)]
struct ManagedTokenFile {
    #[serde(rename = "type")]
    kind: String,
    token: ManagedTokenBlock,
}

#[derive(Deserialize)]
struct ManagedTokenBlock {
    access_token: SecretString,
    #[serde(default)]
    refresh_token: Option<SecretString>,
    #[serde(default)]
    expiry: Option<i64>,
}
