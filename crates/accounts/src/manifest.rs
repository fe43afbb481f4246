use std::path::Path;

use {gembox_oauth::AccountEntry, serde::{Deserialize, Serialize}};

/// Account listing file inside the store root.
pub const MANIFEST_FILENAME: &str = "accounts.json";

/// The account manifest maintained by the surrounding tool.
///
/// Each entry names its own token file inside the store root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountManifest {
    /// Name of the default account, when one is chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
}

impl AccountManifest {
    /// Read the manifest; a missing or unparseable file is simply no manifest.
    pub fn load(path: &Path) -> Option<Self> {
        let raw = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&raw).ok()
    }

    pub fn default_entry(&self) -> Option<&AccountEntry> {
        let name = self.default.as_deref()?;
        self.accounts.iter().find(|a| a.name == name)
    }
}
