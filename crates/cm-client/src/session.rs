//! Session token storage.
//!
//! The bearer token obtained at login lives here until sign-out or until
//! an authenticated endpoint answers 401. There is no refresh.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub stored_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, user_name: Option<String>) -> Self {
        Self {
            token: token.into(),
            user_name,
            stored_at: Utc::now(),
        }
    }
}

/// Where the session token is kept.
pub trait SessionStore: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file on disk, readable only by the owner on unix.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Session(format!("{}: {}", self.path.display(), e))),
        };

        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Session(format!("{}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_string_pretty(session)?;
        let io_err = |e: std::io::Error| Error::Session(format!("{}: {}", self.path.display(), e));

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(io_err)?;

        // mode() only applies to new files; tighten one left by an older run
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }
        file.write_all(content.as_bytes()).map_err(io_err)?;

        debug!(path = %self.path.display(), "Session stored");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Session(format!("{}: {}", self.path.display(), e))),
        }
    }
}

/// In-process store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Some(Session::new(token, None))),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.inner.read().clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.inner.write() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.write() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        assert_eq!(store.load().unwrap(), None);

        let session = Session::new("jwt-abc", Some("frontdesk".into()));
        store.save(&session).unwrap();
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        store.save(&Session::new("t", None)).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_readable_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "a much longer stale session payload than the new one").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let store = FileSessionStore::new(&path);
        store.save(&Session::new("t", None)).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.load().unwrap().unwrap().token, "t");
    }

    #[test]
    fn test_corrupt_file_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::with_token("abc");
        assert_eq!(store.load().unwrap().unwrap().token, "abc");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
