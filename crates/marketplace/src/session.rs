//! Durable session store.
//!
//! A small key-value store persisted as YAML. The only entry the client
//! relies on is `token`, written at login and cleared at logout or account
//! deletion. The store is passed explicitly to whatever needs it.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key under which the session token is stored.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,

    /// Last time any entry was written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Session state, optionally backed by a file.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    path: Option<PathBuf>,
    state: SessionFile,
}

impl SessionStore {
    /// Open the store at `path`. A missing file is an empty session.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session file {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Malformed session file {}", path.display()))?
        } else {
            SessionFile::default()
        };

        tracing::debug!(path = %path.display(), entries = state.entries.len(), "Session loaded");

        Ok(Self {
            path: Some(path),
            state,
        })
    }

    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A store holding `token`, not backed by a file.
    pub fn with_token(token: impl Into<String>) -> Self {
        let mut store = Self::in_memory();
        store.state.entries.insert(TOKEN_KEY.to_string(), token.into());
        store
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.state.entries.get(key).map(String::as_str)
    }

    /// Set an entry and persist.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.state.entries.insert(key.to_string(), value.into());
        self.state.updated_at = Some(Utc::now());
        self.save()
    }

    /// Remove every entry and persist.
    pub fn clear(&mut self) -> Result<()> {
        self.state.entries.clear();
        self.state.updated_at = Some(Utc::now());
        self.save()
    }

    /// The session token, if one is stored and non-empty.
    pub fn token(&self) -> Option<&str> {
        self.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_token(&mut self, token: impl Into<String>) -> Result<()> {
        self.set(TOKEN_KEY, token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.state.updated_at
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(&self.state)?;
        write_private(path, content.as_bytes())
            .with_context(|| format!("Failed to write session file {}", path.display()))?;
        Ok(())
    }
}

/// Write `content` readable by the owner only; the file holds a credential.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content)
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::load(dir.path().join("session.yaml")).unwrap();
        assert!(store.token().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_token_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.yaml");

        let mut store = SessionStore::load(&path).unwrap();
        store.set_token("abc123").unwrap();
        assert!(store.updated_at().is_some());

        let reopened = SessionStore::load(&path).unwrap();
        assert_eq!(reopened.token(), Some("abc123"));
    }

    #[test]
    fn test_clear_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");

        let mut store = SessionStore::load(&path).unwrap();
        store.set_token("abc123").unwrap();
        store.set("theme", "dark").unwrap();
        store.clear().unwrap();

        let reopened = SessionStore::load(&path).unwrap();
        assert!(reopened.token().is_none());
        assert!(reopened.get("theme").is_none());
    }

    #[test]
    fn test_empty_token_is_absent() {
        let store = SessionStore::with_token("");
        assert!(store.token().is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");
        fs::write(&path, "entries: [not, a, map]").unwrap();
        assert!(SessionStore::load(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.yaml");
        fs::write(&path, "entries: {}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let mut store = SessionStore::load(&path).unwrap();
        store.set_token("abc123").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
