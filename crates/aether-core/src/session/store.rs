//! In-memory session store.
//!
//! `SessionStore` owns every session plus the single active-session
//! pointer. All session mutations go through [`SessionStore::update`], which
//! works on a clone and commits only when the closure and the invariant
//! checks both succeed, so no partial update is ever observable.

use super::model::Session;
use crate::error::{AetherError, Result};

/// Ordered collection of sessions with exactly one active session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Vec<Session>,
    active_id: String,
}

impl SessionStore {
    /// Builds a store from previously loaded sessions.
    ///
    /// An empty set gets one fresh session. An unknown or missing active id
    /// falls back to the first session.
    pub fn initialize(mut sessions: Vec<Session>, active_id: Option<String>) -> Self {
        if sessions.is_empty() {
            sessions.push(Session::new());
        }
        let active_id = active_id
            .filter(|id| sessions.iter().any(|s| &s.id == id))
            .unwrap_or_else(|| sessions[0].id.clone());
        tracing::debug!(
            "SessionStore initialized with {} session(s), active={}",
            sessions.len(),
            active_id
        );
        Self {
            sessions,
            active_id,
        }
    }

    /// Creates a store holding a single fresh session.
    pub fn new() -> Self {
        Self::initialize(Vec::new(), None)
    }

    /// Appends a fresh session and makes it active.
    pub fn create_session(&mut self) -> &Session {
        let session = Session::new();
        tracing::info!("Created session {} ({})", session.id, session.name);
        self.active_id = session.id.clone();
        self.sessions.push(session);
        let last = self.sessions.len() - 1;
        &self.sessions[last]
    }

    /// Makes `id` the active session.
    pub fn select(&mut self, id: &str) -> Result<()> {
        if self.position(id).is_none() {
            return Err(AetherError::not_found("Session", id));
        }
        tracing::debug!("Active session {} -> {}", self.active_id, id);
        self.active_id = id.to_string();
        Ok(())
    }

    /// Removes a session, refusing to remove the last one.
    ///
    /// When the active session is removed the first survivor becomes active.
    pub fn delete(&mut self, id: &str) -> Result<Session> {
        let index = self
            .position(id)
            .ok_or_else(|| AetherError::not_found("Session", id))?;
        if self.sessions.len() == 1 {
            return Err(AetherError::LastSession);
        }
        let removed = self.sessions.remove(index);
        if self.active_id == removed.id {
            self.active_id = self.sessions[0].id.clone();
        }
        tracing::info!(
            "Deleted session {} ({}), active={}",
            removed.id,
            removed.name,
            self.active_id
        );
        Ok(removed)
    }

    /// Applies `f` to session `id` atomically.
    ///
    /// The closure runs on a copy. The copy replaces the stored session only
    /// when `f` returns `Ok` and the versioning invariants still hold.
    pub fn update<F, T>(&mut self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let index = self
            .position(id)
            .ok_or_else(|| AetherError::not_found("Session", id))?;
        let mut draft = self.sessions[index].clone();
        let output = f(&mut draft)?;
        if draft.id != self.sessions[index].id {
            return Err(AetherError::internal("session id is immutable"));
        }
        draft
            .check_invariants()
            .map_err(|reason| AetherError::internal(format!("session {id}: {reason}")))?;
        self.sessions[index] = draft;
        Ok(output)
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Returns the active session.
    pub fn active(&self) -> &Session {
        // initialize() and delete() keep active_id pointing at a stored session
        self.get(&self.active_id).unwrap_or(&self.sessions[0])
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Sessions in insertion order.
    pub fn list(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Always false: the store never holds fewer than one session.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::CodeVersion;

    #[test]
    fn test_initialize_empty_creates_session() {
        let store = SessionStore::initialize(Vec::new(), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.active().id, store.list()[0].id);
    }

    #[test]
    fn test_initialize_invalid_active_falls_back_to_first() {
        let a = Session::new();
        let b = Session::new();
        let first = a.id.clone();
        let store = SessionStore::initialize(vec![a, b], Some("missing".into()));
        assert_eq!(store.active_id(), first);
    }

    #[test]
    fn test_initialize_keeps_valid_active() {
        let a = Session::new();
        let b = Session::new();
        let second = b.id.clone();
        let store = SessionStore::initialize(vec![a, b], Some(second.clone()));
        assert_eq!(store.active_id(), second);
    }

    #[test]
    fn test_create_session_becomes_active() {
        let mut store = SessionStore::new();
        let id = store.create_session().id.clone();
        assert_eq!(store.len(), 2);
        assert_eq!(store.active_id(), id);
        assert_eq!(store.list()[1].id, id);
    }

    #[test]
    fn test_select_unknown_is_rejected() {
        let mut store = SessionStore::new();
        let before = store.active_id().to_string();
        let err = store.select("nope").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.active_id(), before);
    }

    #[test]
    fn test_delete_last_session_is_rejected() {
        let mut store = SessionStore::new();
        let id = store.active_id().to_string();
        let err = store.delete(&id).unwrap_err();
        assert!(matches!(err, AetherError::LastSession));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_active_activates_survivor() {
        let mut store = SessionStore::new();
        let first = store.active_id().to_string();
        let second = store.create_session().id.clone();
        store.delete(&second).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), first);
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut store = SessionStore::new();
        let first = store.active_id().to_string();
        let second = store.create_session().id.clone();
        store.create_session();
        store.select(&second).unwrap();
        store.delete(&first).unwrap();
        assert_eq!(store.active_id(), second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_update_commits_on_success() {
        let mut store = SessionStore::new();
        let id = store.active_id().to_string();
        store
            .update(&id, |s| {
                s.commit_version(CodeVersion::new("const A = () => <a/>", ""));
                Ok(())
            })
            .unwrap();
        assert_eq!(store.active().code_history.len(), 2);
    }

    #[test]
    fn test_update_failure_leaves_session_untouched() {
        let mut store = SessionStore::new();
        let id = store.active_id().to_string();
        let before = store.active().clone();
        let result: Result<()> = store.update(&id, |s| {
            s.name = "changed".into();
            Err(AetherError::invalid_input("nope"))
        });
        assert!(result.is_err());
        assert_eq!(store.active(), &before);
    }

    #[test]
    fn test_update_rejects_invariant_violation() {
        let mut store = SessionStore::new();
        let id = store.active_id().to_string();
        let before = store.active().clone();
        let result = store.update(&id, |s| {
            s.current_version = 3;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(store.active(), &before);
    }
}
