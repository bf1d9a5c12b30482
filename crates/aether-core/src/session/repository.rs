//! Session snapshot repository trait.
//!
//! Defines the interface for persisting the whole session collection.

use super::model::Session;
use super::store::SessionStore;
use crate::error::Result;
use async_trait::async_trait;

/// Full snapshot of the persisted session state.
///
/// Every save writes a complete snapshot; there are no incremental patches,
/// so a failed write never corrupts an earlier successful one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// All sessions in store order.
    pub sessions: Vec<Session>,
    /// The active session id, if one was recorded.
    pub active_session_id: Option<String>,
}

impl SessionSnapshot {
    /// Captures the current contents of a store.
    pub fn of(store: &SessionStore) -> Self {
        Self {
            sessions: store.list().to_vec(),
            active_session_id: Some(store.active_id().to_string()),
        }
    }

    /// Rebuilds a store from this snapshot.
    pub fn into_store(self) -> SessionStore {
        SessionStore::initialize(self.sessions, self.active_session_id)
    }
}

/// An abstract repository for session persistence.
///
/// This trait decouples the application's core logic from the specific
/// storage mechanism (key/value JSON files, browser storage, remote API).
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Schema versioning and migrations of stored sessions
/// - Atomic replacement of the previous snapshot
#[async_trait]
pub trait SessionSnapshotRepository: Send + Sync {
    /// Loads the persisted snapshot.
    ///
    /// # Returns
    ///
    /// - `Ok(SessionSnapshot)`: Stored state (empty when nothing was saved yet)
    /// - `Err(_)`: Stored state exists but is unreadable or corrupt
    async fn load(&self) -> Result<SessionSnapshot>;

    /// Replaces the persisted snapshot.
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;
}
