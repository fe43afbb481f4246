//! Format-preserving persistence of refreshed credentials.

use std::{io, path::Path};

use {secrecy::ExposeSecret, serde_json::Value, tracing::debug};

use crate::{
    error::{AuthError, AuthResult},
    types::{CredentialRecord, SourceKind, TokenSource},
};

/// Persist `record` to the location it was resolved from.
///
/// The source is the one remembered at read time; the writer never guesses.
pub fn write_back(source: &TokenSource, record: &CredentialRecord) -> AuthResult<()> {
    match source.kind {
        SourceKind::ManagedStore => write_managed(&source.path, record),
        SourceKind::LegacyFile => write_legacy(&source.path, record),
    }
}

/// Merge only the `token` triplet into the existing account file.
///
/// The file is re-read at write time so sibling fields mutated out-of-band
/// since the original read (email, project id) survive.
fn write_managed(path: &Path, record: &CredentialRecord) -> AuthResult<()> {
    let raw = std::fs::read_to_string(path).map_err(|e| AuthError::write(path, e))?;
    let mut value: Value =
        serde_json::from_str(&raw).map_err(|e| AuthError::write(path, invalid_data(e)))?;
    let Some(root) = value.as_object_mut() else {
        return Err(AuthError::write(
            path,
            io::Error::new(io::ErrorKind::InvalidData, "account file is not a JSON object"),
        ));
    };

    let token = root
        .entry("token")
        .or_insert_with(|| Value::Object(serde_json::Map::new()));
    if !token.is_object() {
        *token = Value::Object(serde_json::Map::new());
    }
    if let Some(fields) = token.as_object_mut() {
        fields.insert(
            "access_token".into(),
            Value::String(record.access_token.expose_secret().clone()),
        );
        if let Some(refresh) = &record.refresh_token {
            fields.insert(
                "refresh_token".into(),
                Value::String(refresh.expose_secret().clone()),
            );
        }
        if let Some(expiry) = record.expiry {
            fields.insert("expiry".into(), expiry.into());
        }
    }

    let data =
        serde_json::to_string_pretty(&value).map_err(|e| AuthError::write(path, invalid_data(e)))?;
    write_secret_file(path, &data)
}

/// Rewrite the whole legacy file in its native field names, carrying along
/// any fields this tool does not interpret.
fn write_legacy(path: &Path, record: &CredentialRecord) -> AuthResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AuthError::write(path, e))?;
        set_owner_only_dir(parent).map_err(|e| AuthError::write(path, e))?;
    }
    let data = serde_json::to_string_pretty(&record.to_legacy())
        .map_err(|e| AuthError::write(path, invalid_data(e)))?;
    write_secret_file(path, &data)
}

/// Write the file, then restrict it to owner-only access.
fn write_secret_file(path: &Path, data: &str) -> AuthResult<()> {
    std::fs::write(path, data).map_err(|e| AuthError::write(path, e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| AuthError::write(path, e))?;
    }
    debug!(path = %path.display(), "persisted credentials");
    Ok(())
}

#[cfg(unix)]
fn set_owner_only_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn set_owner_only_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn invalid_data(e: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}
