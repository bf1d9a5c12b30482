//! Session domain model.
//!
//! This module contains the core Session entity: one independent editing
//! context holding a chat transcript, the current component code and its
//! bounded undo/redo history.

use super::message::{Message, MessageRole};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Initial component source of a session that has not generated anything yet.
pub const PLACEHOLDER_JSX: &str = "<div>Your component will appear here.</div>";

/// Sentinel text identifying the placeholder component.
pub const PLACEHOLDER_MARKER: &str = "Your component will appear here";

/// Initial stylesheet of a fresh session.
pub const PLACEHOLDER_CSS: &str = "/* Your component CSS will appear here */";

/// Content of the system message every session starts with.
pub const SESSION_STARTED_MESSAGE: &str = "New session started.";

/// Maximum number of code versions retained per session.
pub const HISTORY_CAP: usize = 5;

/// Number of characters of the first prompt used as the session name.
pub const NAME_PREFIX_CHARS: usize = 40;

const CREATIVE_NAMES: &[&str] = &[
    "Cosmic Canvas",
    "Quantum Query",
    "Starlight Sketch",
    "Nebula Nudge",
    "Aether Architect",
    "Pixel Weave",
    "Code Comet",
    "Syntax Starship",
    "Orion UI",
    "Galaxy Grids",
    "Celestial Component",
    "Meteor Mockup",
    "Pulsar Prototype",
    "Void Visuals",
    "Infinity Interface",
];

/// Immutable snapshot of component source and stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeVersion {
    pub jsx_code: String,
    pub css_code: String,
}

impl CodeVersion {
    pub fn new(jsx_code: impl Into<String>, css_code: impl Into<String>) -> Self {
        Self {
            jsx_code: jsx_code.into(),
            css_code: css_code.into(),
        }
    }

    /// The version every new session starts with.
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_JSX, PLACEHOLDER_CSS)
    }
}

/// Represents one editing session in the application's domain layer.
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage format or version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Human-readable session name
    pub name: String,
    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,
    /// Chat transcript, append-only
    pub chat_history: Vec<Message>,
    /// Current component source, mirrors `code_history[current_version]`
    pub jsx_code: String,
    /// Current stylesheet, mirrors `code_history[current_version]`
    pub css_code: String,
    /// Image (data URI) attached to the next outgoing prompt
    pub uploaded_image: Option<String>,
    /// Bounded linear undo/redo timeline
    pub code_history: Vec<CodeVersion>,
    /// Index into `code_history`
    pub current_version: usize,
    /// Preview element currently selected (`data-aether-id` value)
    pub selected_element_id: Option<String>,
}

impl Session {
    /// Creates a fresh session with one placeholder version and one system message.
    pub fn new() -> Self {
        let created_at = Utc::now();
        let version = CodeVersion::placeholder();
        Self {
            id: Uuid::new_v4().to_string(),
            name: creative_name(created_at),
            created_at,
            chat_history: vec![Message::system(SESSION_STARTED_MESSAGE)],
            jsx_code: version.jsx_code.clone(),
            css_code: version.css_code.clone(),
            uploaded_image: None,
            code_history: vec![version],
            current_version: 0,
            selected_element_id: None,
        }
    }

    /// Returns true while no real component has been generated.
    pub fn is_placeholder(&self) -> bool {
        self.jsx_code.contains(PLACEHOLDER_MARKER)
    }

    /// Returns true if the transcript holds nothing but system messages.
    pub fn awaiting_first_prompt(&self) -> bool {
        self.chat_history
            .iter()
            .all(|m| m.role == MessageRole::System)
    }

    /// Appends a message to the transcript.
    pub fn push_message(&mut self, message: Message) {
        self.chat_history.push(message);
    }

    /// Renames the session after its first prompt.
    pub fn apply_first_prompt_name(&mut self, prompt: &str) {
        self.name = name_from_prompt(prompt);
    }

    /// Takes the pending image, leaving none behind.
    pub fn take_uploaded_image(&mut self) -> Option<String> {
        self.uploaded_image.take()
    }

    /// Returns the version the session currently points at.
    pub fn current(&self) -> Option<&CodeVersion> {
        self.code_history.get(self.current_version)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a session name from a prompt: a 40-character prefix, with an
/// ellipsis when the prompt was longer.
pub fn name_from_prompt(prompt: &str) -> String {
    let mut chars = prompt.chars();
    let prefix: String = chars.by_ref().take(NAME_PREFIX_CHARS).collect();
    if chars.next().is_some() {
        format!("{prefix}...")
    } else {
        prefix
    }
}

fn creative_name(created_at: DateTime<Utc>) -> String {
    CREATIVE_NAMES
        .choose(&mut rand::thread_rng())
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Session {}", created_at.format("%Y-%m-%d %H:%M:%S")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_placeholder() {
        let session = Session::new();
        assert!(session.is_placeholder());
        assert_eq!(session.code_history, vec![CodeVersion::placeholder()]);
        assert_eq!(session.current_version, 0);
        assert_eq!(session.chat_history.len(), 1);
        assert_eq!(session.chat_history[0].role, MessageRole::System);
        assert_eq!(session.chat_history[0].content, SESSION_STARTED_MESSAGE);
        assert!(session.awaiting_first_prompt());
    }

    #[test]
    fn test_new_session_gets_creative_name() {
        let session = Session::new();
        assert!(CREATIVE_NAMES.contains(&session.name.as_str()));
    }

    #[test]
    fn test_name_from_short_prompt() {
        assert_eq!(name_from_prompt("A login form"), "A login form");
    }

    #[test]
    fn test_name_from_long_prompt_is_truncated() {
        let prompt = "A pricing table with three tiers and a highlighted middle column";
        let name = name_from_prompt(prompt);
        assert_eq!(name, "A pricing table with three tiers and a h...");
        assert_eq!(name.chars().count(), NAME_PREFIX_CHARS + 3);
    }

    #[test]
    fn test_name_exactly_forty_chars_has_no_ellipsis() {
        let prompt = "x".repeat(NAME_PREFIX_CHARS);
        assert_eq!(name_from_prompt(&prompt), prompt);
    }

    #[test]
    fn test_name_counts_characters_not_bytes() {
        let prompt = "é".repeat(50);
        let name = name_from_prompt(&prompt);
        assert_eq!(name, format!("{}...", "é".repeat(40)));
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let json = serde_json::to_value(Session::new()).unwrap();
        assert!(json.get("chatHistory").is_some());
        assert!(json.get("codeHistory").is_some());
        assert_eq!(json["currentVersion"], 0);
        assert!(json["selectedElementId"].is_null());
    }
}
