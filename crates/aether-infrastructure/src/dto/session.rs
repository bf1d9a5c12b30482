//! Session DTOs and migrations

use aether_core::session::{CodeVersion, Message, Session};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use version_migrate::{IntoDomain, MigratesTo, Versioned};

/// Entity name the session migration path is registered under.
pub const SESSION_ENTITY: &str = "session";

// ============================================================================
// Session DTOs
// ============================================================================

/// V1.0.0: browser-era record, no undo/redo timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.0.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_0_0 {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// ISO 8601 timestamp
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub chat_history: Vec<Message>,
    #[serde(default)]
    pub jsx_code: String,
    #[serde(default)]
    pub css_code: String,
    #[serde(default)]
    pub uploaded_image: Option<String>,
}

/// V1.1.0: adds `codeHistory` and `currentVersion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.1.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_1_0 {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub chat_history: Vec<Message>,
    #[serde(default)]
    pub jsx_code: String,
    #[serde(default)]
    pub css_code: String,
    #[serde(default)]
    pub uploaded_image: Option<String>,
    #[serde(default)]
    pub code_history: Vec<CodeVersion>,
    /// Signed so corrupt negative indices still parse and get clamped.
    #[serde(default)]
    pub current_version: i64,
}

/// V1.2.0: adds `selectedElementId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Versioned)]
#[versioned(version = "1.2.0")]
#[serde(rename_all = "camelCase")]
pub struct SessionV1_2_0 {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub chat_history: Vec<Message>,
    #[serde(default)]
    pub jsx_code: String,
    #[serde(default)]
    pub css_code: String,
    #[serde(default)]
    pub uploaded_image: Option<String>,
    #[serde(default)]
    pub code_history: Vec<CodeVersion>,
    #[serde(default)]
    pub current_version: i64,
    #[serde(default)]
    pub selected_element_id: Option<String>,
}

// ============================================================================
// Migration implementations
// ============================================================================

/// Migration from SessionV1_0_0 to SessionV1_1_0.
/// The current code becomes a single-entry history at index 0.
impl MigratesTo<SessionV1_1_0> for SessionV1_0_0 {
    fn migrate(self) -> SessionV1_1_0 {
        SessionV1_1_0 {
            code_history: vec![CodeVersion::new(self.jsx_code.clone(), self.css_code.clone())],
            current_version: 0,
            id: self.id,
            name: self.name,
            created_at: self.created_at,
            chat_history: self.chat_history,
            jsx_code: self.jsx_code,
            css_code: self.css_code,
            uploaded_image: self.uploaded_image,
        }
    }
}

/// Migration from SessionV1_1_0 to SessionV1_2_0.
/// Empty strings left by older writers mean none.
impl MigratesTo<SessionV1_2_0> for SessionV1_1_0 {
    fn migrate(self) -> SessionV1_2_0 {
        SessionV1_2_0 {
            id: self.id,
            name: self.name,
            created_at: self.created_at,
            chat_history: self.chat_history,
            jsx_code: self.jsx_code,
            css_code: self.css_code,
            uploaded_image: self.uploaded_image.filter(|image| !image.is_empty()),
            code_history: self.code_history,
            current_version: self.current_version,
            selected_element_id: None,
        }
    }
}

// ============================================================================
// Domain model conversions
// ============================================================================

/// Out-of-range indices are clamped and the current code is reloaded from
/// the history, so a hand-edited file cannot break the invariants.
impl IntoDomain<Session> for SessionV1_2_0 {
    fn into_domain(self) -> Session {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| {
                tracing::warn!(
                    "Session {} has unparseable createdAt '{}', using now",
                    self.id,
                    self.created_at
                );
                Utc::now()
            });

        let mut session = Session {
            id: self.id,
            name: self.name,
            created_at,
            chat_history: self.chat_history,
            jsx_code: self.jsx_code,
            css_code: self.css_code,
            uploaded_image: self.uploaded_image.filter(|image| !image.is_empty()),
            code_history: self.code_history,
            current_version: usize::try_from(self.current_version).unwrap_or(0),
            selected_element_id: self.selected_element_id.filter(|id| !id.is_empty()),
        };
        if session.check_invariants().is_err() {
            tracing::warn!("Session {} violated history invariants, resyncing", session.id);
        }
        session.resync();
        session
    }
}

impl version_migrate::FromDomain<Session> for SessionV1_2_0 {
    fn from_domain(session: Session) -> Self {
        let Session {
            id,
            name,
            created_at,
            chat_history,
            jsx_code,
            css_code,
            uploaded_image,
            code_history,
            current_version,
            selected_element_id,
        } = session;

        SessionV1_2_0 {
            id,
            name,
            created_at: created_at.to_rfc3339(),
            chat_history,
            jsx_code,
            css_code,
            uploaded_image,
            code_history,
            current_version: i64::try_from(current_version).unwrap_or(i64::MAX),
            selected_element_id,
        }
    }
}

// ============================================================================
// Migrator factory
// ============================================================================

/// Creates and configures a Migrator instance for Session entities.
///
/// # Migration Path
///
/// - V1.0.0 → V1.1.0: Backfills `codeHistory` from `jsxCode`/`cssCode`
/// - V1.1.0 → V1.2.0: Adds `selectedElementId`, drops empty `uploadedImage`
/// - V1.2.0 → Session: Clamps `currentVersion` and resyncs the current code
pub fn create_session_migrator() -> version_migrate::Migrator {
    let mut migrator = version_migrate::Migrator::builder().build();

    let session_path = version_migrate::Migrator::define(SESSION_ENTITY)
        .from::<SessionV1_0_0>()
        .step::<SessionV1_1_0>()
        .step::<SessionV1_2_0>()
        .into_with_save::<Session>();

    migrator
        .register(session_path)
        .expect("Failed to register session migration path");

    migrator
}
