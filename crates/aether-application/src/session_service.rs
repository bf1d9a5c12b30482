//! Session use cases.
//!
//! `SessionService` couples the in-memory [`SessionStore`] with snapshot
//! persistence and user notifications. Every state change is followed by an
//! explicit [`SessionService::persist`].

use crate::clipboard::{Clipboard, CopyOutcome, SystemClipboard};
use crate::code_kind::CodeKind;
use crate::export;
use aether_core::error::{AetherError, Result};
use aether_core::flow::DataUri;
use aether_core::notification::{Notification, Notifier};
use aether_core::preview::CodePreparer;
use aether_core::selection::{NodeId, PreviewDom};
use aether_core::session::{
    CodeVersion, Session, SessionSnapshot, SessionSnapshotRepository, SessionStore,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Number of sessions shown on the landing page.
pub const RECENT_SESSION_LIMIT: usize = 5;

pub struct SessionService {
    store: Arc<RwLock<SessionStore>>,
    repository: Arc<dyn SessionSnapshotRepository>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    preparer: CodePreparer,
}

impl SessionService {
    pub fn new(
        store: SessionStore,
        repository: Arc<dyn SessionSnapshotRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            repository,
            notifier,
            clipboard: Arc::new(SystemClipboard),
            preparer: CodePreparer::default(),
        }
    }

    /// Replaces the desktop clipboard used by [`SessionService::copy_code`].
    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Loads the persisted sessions.
    ///
    /// Unreadable storage is logged and replaced by a single fresh session.
    pub async fn bootstrap(
        repository: Arc<dyn SessionSnapshotRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = match repository.load().await {
            Ok(snapshot) => snapshot.into_store(),
            Err(e) => {
                tracing::warn!("Failed to load sessions, starting fresh: {}", e);
                SessionStore::new()
            }
        };
        Self::new(store, repository, notifier)
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Writes the full snapshot.
    ///
    /// A failure is logged and reported; the next successful write supersedes it.
    pub async fn persist(&self) -> bool {
        let snapshot = {
            let store = self.store.read().await;
            SessionSnapshot::of(&store)
        };
        match self.repository.save(&snapshot).await {
            Ok(()) => {
                tracing::debug!("Persisted {} session(s)", snapshot.sessions.len());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to persist sessions: {}", e);
                self.notifier.notify(Notification::destructive(
                    "Could not save sessions",
                    "Your changes are kept and will be saved with the next update.",
                ));
                false
            }
        }
    }

    // ============================================================================
    // Queries
    // ============================================================================

    pub async fn active(&self) -> Session {
        self.store.read().await.active().clone()
    }

    pub async fn active_id(&self) -> String {
        self.store.read().await.active_id().to_string()
    }

    pub async fn session(&self, id: &str) -> Option<Session> {
        self.store.read().await.get(id).cloned()
    }

    /// All sessions in creation order.
    pub async fn sessions(&self) -> Vec<Session> {
        self.store.read().await.list().to_vec()
    }

    /// The newest sessions first, at most [`RECENT_SESSION_LIMIT`].
    pub async fn recent_sessions(&self) -> Vec<Session> {
        let mut sessions = self.sessions().await;
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions.truncate(RECENT_SESSION_LIMIT);
        sessions
    }

    /// Renderable expression for the active component.
    pub async fn prepared_preview(&self) -> String {
        let store = self.store.read().await;
        self.preparer.prepare(&store.active().jsx_code)
    }

    /// Preview DOM of the active component with the current selection highlighted.
    pub async fn preview_dom(&self) -> PreviewDom {
        let session = self.active().await;
        let mut dom = PreviewDom::from_markup(&session.jsx_code);
        dom.apply_highlight(session.selected_element_id.as_deref());
        dom
    }

    // ============================================================================
    // Session lifecycle
    // ============================================================================

    pub async fn create_session(&self) -> Session {
        let session = self.store.write().await.create_session().clone();
        self.persist().await;
        session
    }

    pub async fn select_session(&self, id: &str) -> Result<()> {
        self.store.write().await.select(id)?;
        self.persist().await;
        Ok(())
    }

    /// Deletes a session. Deleting the last one is refused with a notice.
    pub async fn delete_session(&self, id: &str) -> Result<Session> {
        let result = self.store.write().await.delete(id);
        match result {
            Ok(removed) => {
                self.persist().await;
                Ok(removed)
            }
            Err(AetherError::LastSession) => {
                self.notifier.notify(Notification::destructive(
                    "Cannot delete the last session",
                    "Create a new session before deleting this one.",
                ));
                Err(AetherError::LastSession)
            }
            Err(e) => Err(e),
        }
    }

    // ============================================================================
    // Mutations of the active session
    // ============================================================================

    /// Applies `f` to session `id` through the store's update funnel.
    ///
    /// Does not persist; callers decide when to write.
    pub async fn update<F, T>(&self, id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        self.store.write().await.update(id, f)
    }

    async fn update_active<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session) -> Result<T>,
    {
        let output = {
            let mut store = self.store.write().await;
            let id = store.active_id().to_string();
            store.update(&id, f)?
        };
        self.persist().await;
        Ok(output)
    }

    /// Stores a pending reference image for the next prompt.
    pub async fn set_image(&self, data_uri: String) -> Result<()> {
        DataUri::parse(&data_uri).map_err(|e| AetherError::invalid_input(e.to_string()))?;
        self.update_active(|session| {
            session.uploaded_image = Some(data_uri);
            Ok(())
        })
        .await
    }

    /// Drops the pending image. Returns false if there was none.
    pub async fn clear_image(&self) -> Result<bool> {
        self.update_active(|session| Ok(session.take_uploaded_image().is_some()))
            .await
    }

    /// Replaces one source by hand, committing a new version.
    ///
    /// The component source may not be blanked: refinement needs a base
    /// component to work from.
    pub async fn edit_code(&self, kind: CodeKind, code: String) -> Result<()> {
        if kind == CodeKind::Jsx && code.trim().is_empty() {
            return Err(AetherError::invalid_input("component code must not be empty"));
        }
        self.update_active(|session| {
            let version = match kind {
                CodeKind::Jsx => CodeVersion::new(code, session.css_code.clone()),
                CodeKind::Css => CodeVersion::new(session.jsx_code.clone(), code),
            };
            session.commit_version(version);
            session.selected_element_id = None;
            Ok(())
        })
        .await
    }

    /// Steps back one version. Returns false at the oldest version.
    pub async fn undo(&self) -> Result<bool> {
        self.update_active(|session| Ok(session.undo())).await
    }

    /// Steps forward one version. Returns false at the newest version.
    pub async fn redo(&self) -> Result<bool> {
        self.update_active(|session| Ok(session.redo())).await
    }

    /// Sets or clears the selected preview element.
    pub async fn select_element(&self, element_id: Option<String>) -> Result<()> {
        self.update_active(|session| {
            session.selected_element_id = element_id;
            Ok(())
        })
        .await
    }

    /// Simulates a click on preview node `node`.
    ///
    /// Selects the nearest tagged ancestor; clicking untagged content clears
    /// the selection.
    pub async fn pick_element(&self, node: NodeId) -> Result<Option<String>> {
        self.update_active(|session| {
            let dom = PreviewDom::from_markup(&session.jsx_code);
            if dom.node(node).is_none() {
                return Err(AetherError::not_found("Preview node", node.to_string()));
            }
            let selected = dom.resolve_selection(node);
            session.selected_element_id = selected.clone();
            Ok(selected)
        })
        .await
    }

    // ============================================================================
    // Output
    // ============================================================================

    /// Copies one source of the active session to the clipboard.
    ///
    /// Without a usable clipboard the code is handed back for display and
    /// the notice says so.
    pub async fn copy_code(&self, kind: CodeKind) -> CopyOutcome {
        let code = {
            let store = self.store.read().await;
            kind.source(store.active()).to_string()
        };
        match self.clipboard.set_text(&code) {
            Ok(()) => {
                self.notifier.notify(Notification::info(
                    format!("{} Copied!", kind.label()),
                    "The code has been copied to your clipboard.",
                ));
                CopyOutcome::Copied
            }
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {}", e);
                self.notifier.notify(Notification::destructive(
                    "Clipboard unavailable",
                    format!("The {} code is printed below instead.", kind.label()),
                ));
                CopyOutcome::Unavailable(code)
            }
        }
    }

    /// Writes the active component as a zip archive to `path`.
    pub async fn export_zip(&self, path: &Path) -> Result<()> {
        let session = self.active().await;
        export::write_archive(path, &session.jsx_code, &session.css_code)
            .map_err(|e| AetherError::io(format!("{:#}", e)))?;
        self.notifier.notify(Notification::info(
            "Downloaded!",
            "Component files zipped and downloaded.",
        ));
        Ok(())
    }
}
