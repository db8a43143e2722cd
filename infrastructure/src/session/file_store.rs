//! JSON file holding the session record.
//!
//! The file is a single object, e.g.
//! `{"authenticated":true,"logged_in_at":"2026-01-05T09:30:00Z"}`.

use compend_application::{SessionStore, SessionStoreError};
use compend_domain::SessionRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// [`SessionStore`] backed by a JSON file.
///
/// A missing or unparsable file reads as "no session"; only failures to
/// write or remove the file are errors.
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
    fn load(&self) -> Result<Option<SessionRecord>, SessionStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!("Could not read session file {}: {}", self.path.display(), e);
                return Ok(None);
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(
                    "Ignoring corrupt session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| SessionStoreError::Unavailable(e.to_string()))?;
        fs::write(&self.path, json)?;
        debug!("Session written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
