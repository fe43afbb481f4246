use std::path::{Path, PathBuf};

use {
    gembox_config::GemboxConfig,
    gembox_oauth::{AccountDirectory, AccountEntry, ProviderConfig},
    serde_json::Value,
};

use crate::manifest::{AccountManifest, MANIFEST_FILENAME};

/// Managed account store on the local filesystem.
///
/// Store root resolution: `accounts.dir` from `gembox.toml`, else
/// `<config dir>/accounts`.
#[derive(Debug, Clone)]
pub struct FsAccountDirectory {
    root: Option<PathBuf>,
    provider_tag: String,
}

impl FsAccountDirectory {
    pub fn from_config(provider: &ProviderConfig, cfg: &GemboxConfig) -> Self {
        let root = cfg
            .accounts
            .dir
            .clone()
            .or_else(|| gembox_config::config_dir().map(|d| d.join("accounts")));
        Self {
            root,
            provider_tag: provider.tag.clone(),
        }
    }

    /// Store rooted at a specific path (useful for testing).
    pub fn with_root(root: PathBuf, provider_tag: impl Into<String>) -> Self {
        Self {
            root: Some(root),
            provider_tag: provider_tag.into(),
        }
    }

    fn manifest(&self) -> Option<AccountManifest> {
        AccountManifest::load(&self.root.as_ref()?.join(MANIFEST_FILENAME))
    }
}

impl AccountDirectory for FsAccountDirectory {
    fn store_root(&self) -> Option<PathBuf> {
        self.root.as_ref().filter(|r| r.is_dir()).cloned()
    }

    fn default_account(&self) -> Option<AccountEntry> {
        self.manifest()?.default_entry().cloned()
    }

    fn list_accounts(&self) -> Vec<AccountEntry> {
        self.manifest().map(|m| m.accounts).unwrap_or_default()
    }

    /// Attribute a file to the provider by content: either it carries the
    /// provider tag, or it nests a Google-style bearer token in the managed
    /// layout.
    fn classify(&self, path: &Path) -> bool {
        let Ok(raw) = std::fs::read_to_string(path) else {
            return false;
        };
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            return false;
        };
        if value.get("type").and_then(Value::as_str) == Some(self.provider_tag.as_str()) {
            return true;
        }
        value
            .pointer("/token/access_token")
            .and_then(Value::as_str)
            .is_some_and(|t| t.starts_with("ya29."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_manifest(manifest: &str) -> (tempfile::TempDir, FsAccountDirectory) {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(MANIFEST_FILENAME), manifest).unwrap();
        let dir = FsAccountDirectory::with_root(tmp.path().to_path_buf(), "gemini_oauth");
        (tmp, dir)
    }

    #[test]
    fn default_account_comes_from_manifest() {
        let (_tmp, dir) = store_with_manifest(
            r#"{"default": "work",
                "accounts": [{"name": "work", "token_file": "gemini-work.json"}]}"#,
        );
        assert_eq!(dir.default_account().unwrap().name, "work");
    }

    #[test]
    fn accounts_keep_manifest_order() {
        let (_tmp, dir) = store_with_manifest(
            r#"{"accounts": [
                {"name": "b", "token_file": "gemini-b.json"},
                {"name": "a", "token_file": "gemini-a.json"}]}"#,
        );
        let names: Vec<String> = dir.list_accounts().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn store_root_requires_an_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("gone");
        let dir = FsAccountDirectory::with_root(missing, "gemini_oauth");
        assert!(dir.store_root().is_none());
        assert!(dir.default_account().is_none());
        assert!(dir.list_accounts().is_empty());
    }

    #[test]
    fn classify_accepts_provider_tag() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("unnamed.json");
        std::fs::write(&path, r#"{"type": "gemini_oauth", "token": {}}"#).unwrap();
        let dir = FsAccountDirectory::with_root(tmp.path().to_path_buf(), "gemini_oauth");
        assert!(dir.classify(&path));
    }

    #[test]
    fn classify_accepts_google_bearer_shape() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("unnamed.json");
        std::fs::write(
            &path,
            r#"{"token": {"access_token": "ya29.abc"}}"#,
        )
        .unwrap();
        let dir = FsAccountDirectory::with_root(tmp.path().to_path_buf(), "gemini_oauth");
        assert!(dir.classify(&path));
    }

    #[test]
    fn classify_rejects_foreign_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("foreign.json");
        std::fs::write(
            &path,
            r#"{"type": "codex_oauth", "token": {"access_token": "sk-abc"}}"#,
        )
        .unwrap();
        let dir = FsAccountDirectory::with_root(tmp.path().to_path_buf(), "gemini_oauth");
        assert!(!dir.classify(&path));

        let text = tmp.path().join("notes.json");
        std::fs::write(&text, "not json").unwrap();
        assert!(!dir.classify(&text));
    }
}
