//! Session storage port
//!
//! Persists the client-local access flag between runs.

use compend_domain::SessionRecord;
use thiserror::Error;

/// Errors from reading or writing the session record
#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage unavailable: {0}")]
    Unavailable(String),
}

/// Where the session record lives.
///
/// Implementations should treat an unreadable or corrupt record as "no
/// session" rather than an error, so a broken file only forces a new login.
pub trait SessionStore: Send + Sync {
    /// Load the stored record, `None` if there is none.
    fn load(&self) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Replace the stored record.
    fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError>;

    /// Remove the stored record. Removing a missing record is not an error.
    fn clear(&self) -> Result<(), SessionStoreError>;
}
