use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use super::Session;

/// Errors that can occur while reading or writing the persisted session
#[derive(Debug, Error)]
pub enum SessionStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable storage for the one persisted session value
pub trait SessionStorage: Send + Sync {
    /// Load the persisted session. `Ok(None)` means no value has been stored.
    fn load(&self) -> Result<Option<Session>, SessionStorageError>;

    /// Replace the persisted session as a whole unit.
    fn save(&self, session: &Session) -> Result<(), SessionStorageError>;
}

/// JSON-file backed storage, one durable key holding the serialized session
#[derive(Debug)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<Session>, SessionStorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A malformed value hydrates as unauthenticated, never a crash
                warn!(path = %self.path.display(), error = %e, "Persisted session is malformed, ignoring");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let serialized = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, serialized)?;
        debug!(path = %self.path.display(), "Session persisted");
        Ok(())
    }
}

/// In-memory storage for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    value: Mutex<Option<Session>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with an already-persisted session
    pub fn with_session(session: Session) -> Self {
        Self {
            value: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<Session>, SessionStorageError> {
        Ok(self.value.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionStorageError> {
        *self.value.lock().unwrap() = Some(session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AuthUser;

    fn authenticated() -> Session {
        Session::authenticated(
            AuthUser {
                id: "user_1".to_string(),
                name: "bob".to_string(),
                phone: "+15551234567".to_string(),
            },
            None,
            "tok".to_string(),
        )
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("session.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested/session.json"));
        let session = authenticated();
        storage.save(&session).unwrap();
        assert_eq!(storage.load().unwrap(), Some(session));
    }

    #[test]
    fn malformed_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let storage = FileSessionStorage::new(&path);
        assert!(storage.load().unwrap().is_none());
    }
}
