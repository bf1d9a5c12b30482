//! Refinement orchestrator.
//!
//! Classifies each chat submission, evaluated in priority order:
//!
//! 1. scoped code question → `ask_about_code`
//! 2. placeholder component → `generate` (history replaced)
//! 3. otherwise → `refine` (new version committed)
//!
//! The user message is recorded and the pending image spent before the flow
//! is dispatched. The response is applied to the session that was active at
//! submission time; if that session has since been deleted the response is
//! dropped.

mod scoped;

pub use scoped::{ScopedQuestion, parse_scoped_question};

use crate::code_kind::CodeKind;
use crate::session_service::SessionService;
use aether_core::error::{AetherError, Result};
use aether_core::flow::{
    AskAboutCodeInput, AskAboutCodeOutput, FlowError, GenerateInput, GenerateOutput, RefineInput,
    RefineOutput, ResponseType, UiFlows,
};
use aether_core::notification::Notification;
use aether_core::session::{CodeVersion, Message, Session};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const FAILURE_MESSAGE: &str = "An error occurred. Please try again.";
pub const SNIPPET_NOT_FOUND_MESSAGE: &str =
    "The selected code no longer matches the current component, so no change was applied.";

/// What a submission ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Generated,
    Refined,
    Explained(String),
    CodeUpdated(CodeKind),
    SnippetNotFound(CodeKind),
    /// The flow failed; the session code is unchanged.
    Failed(String),
    /// The target session was deleted while the flow was running.
    Discarded,
}

enum Dispatch {
    Ask(ScopedQuestion),
    Generate(GenerateInput),
    Refine(RefineInput),
}

enum Reply {
    Generated(GenerateOutput),
    Refined(RefineOutput),
    Answered(ScopedQuestion, AskAboutCodeOutput),
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct RefinementOrchestrator {
    sessions: Arc<SessionService>,
    flows: Arc<dyn UiFlows>,
    in_flight: AtomicBool,
}

impl RefinementOrchestrator {
    pub fn new(sessions: Arc<SessionService>, flows: Arc<dyn UiFlows>) -> Self {
        Self {
            sessions,
            flows,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one submission against the active session.
    ///
    /// Guard rejections (blank prompt, submission already running) return an
    /// error without touching any session. Flow failures are recovered here
    /// and reported as [`SubmissionOutcome::Failed`].
    pub async fn submit(&self, prompt: &str) -> Result<SubmissionOutcome> {
        if prompt.trim().is_empty() {
            self.sessions.notifier().notify(Notification::info(
                "Nothing to send",
                "Type a prompt before submitting.",
            ));
            return Err(AetherError::invalid_input("prompt is empty"));
        }
        let _in_flight = self.begin()?;

        let session_id = self.sessions.active_id().await;
        let scoped = parse_scoped_question(prompt);
        let dispatch = self
            .sessions
            .update(&session_id, |session| Ok(record_submission(session, prompt, scoped)))
            .await?;
        self.sessions.persist().await;

        let outcome = match self.dispatch(dispatch).await {
            Ok(reply) => self.apply(&session_id, prompt, reply).await?,
            Err(e) => self.fail(&session_id, e).await?,
        };

        if outcome != SubmissionOutcome::Discarded {
            self.sessions.persist().await;
        }
        Ok(outcome)
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.sessions.notifier().notify(Notification::info(
                "Please wait",
                "A request is already in progress.",
            ));
            return Err(AetherError::Busy);
        }
        Ok(InFlight(&self.in_flight))
    }

    async fn dispatch(&self, dispatch: Dispatch) -> std::result::Result<Reply, FlowError> {
        match dispatch {
            Dispatch::Generate(input) => self.flows.generate(input).await.map(Reply::Generated),
            Dispatch::Refine(input) => self.flows.refine(input).await.map(Reply::Refined),
            Dispatch::Ask(question) => {
                let input = AskAboutCodeInput {
                    code_snippet: question.snippet.clone(),
                    user_prompt: question.query.clone(),
                };
                let output = self.flows.ask_about_code(input).await?;
                Ok(Reply::Answered(question, output))
            }
        }
    }

    async fn apply(
        &self,
        session_id: &str,
        prompt: &str,
        reply: Reply,
    ) -> Result<SubmissionOutcome> {
        let result = self
            .sessions
            .update(session_id, |session| Ok(merge_reply(session, prompt, reply)))
            .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) if e.is_not_found() => {
                tracing::warn!(
                    "Session {} was deleted before its response arrived; discarding",
                    session_id
                );
                return Ok(SubmissionOutcome::Discarded);
            }
            Err(e) => return Err(e),
        };

        tracing::info!("Submission on session {} finished: {:?}", session_id, outcome);
        if let SubmissionOutcome::SnippetNotFound(kind) = outcome {
            self.sessions.notifier().notify(Notification::destructive(
                "Selection not found",
                format!("The selected {} was not found in the current code.", kind.label()),
            ));
        }
        Ok(outcome)
    }

    async fn fail(&self, session_id: &str, error: FlowError) -> Result<SubmissionOutcome> {
        tracing::error!("AI flow failed for session {}: {}", session_id, error);

        let recorded = self
            .sessions
            .update(session_id, |session| {
                session.push_message(Message::system(FAILURE_MESSAGE));
                Ok(())
            })
            .await;
        match recorded {
            Err(e) if e.is_not_found() => {
                tracing::warn!("Session {} was deleted before its failure arrived", session_id);
                return Ok(SubmissionOutcome::Discarded);
            }
            other => other?,
        }

        self.sessions.notifier().notify(Notification::destructive(
            "AI Error",
            "Could not generate component. Please try again.",
        ));
        Ok(SubmissionOutcome::Failed(error.to_string()))
    }
}

/// Records the user message, spends the pending image and picks the flow.
fn record_submission(
    session: &mut Session,
    prompt: &str,
    scoped: Option<ScopedQuestion>,
) -> Dispatch {
    if session.awaiting_first_prompt() {
        session.apply_first_prompt_name(prompt);
    }
    let image = session.take_uploaded_image();
    session.push_message(Message::user(prompt, image.clone()));

    match scoped {
        Some(question) => Dispatch::Ask(question),
        None if session.is_placeholder() => Dispatch::Generate(GenerateInput {
            prompt: prompt.to_string(),
            image_data_uri: image,
        }),
        None => Dispatch::Refine(RefineInput {
            prompt: prompt.to_string(),
            base_component_code: session.jsx_code.clone(),
            existing_style_code: Some(session.css_code.clone()),
            image_data_uri: image,
        }),
    }
}

fn merge_reply(session: &mut Session, prompt: &str, reply: Reply) -> SubmissionOutcome {
    match reply {
        Reply::Generated(output) => {
            session.replace_history(CodeVersion::new(output.component_code, output.style_code));
            session.push_message(Message::assistant(component_updated(prompt)));
            SubmissionOutcome::Generated
        }
        Reply::Refined(output) => {
            let css = output
                .refined_style_code
                .unwrap_or_else(|| session.css_code.clone());
            session.commit_version(CodeVersion::new(output.refined_component_code, css));
            session.push_message(Message::assistant(component_updated(prompt)));
            SubmissionOutcome::Refined
        }
        Reply::Answered(question, output) => match output.response_type {
            ResponseType::Explanation => {
                let explanation = output.explanation.unwrap_or_default();
                session.push_message(Message::assistant(explanation.clone()));
                SubmissionOutcome::Explained(explanation)
            }
            ResponseType::CodeUpdate => {
                apply_snippet_update(session, &question, output.updated_code.unwrap_or_default())
            }
        },
    }
}

fn apply_snippet_update(
    session: &mut Session,
    question: &ScopedQuestion,
    updated: String,
) -> SubmissionOutcome {
    let source = question.kind.source(session);
    if !source.contains(&question.snippet) {
        session.push_message(Message::system(SNIPPET_NOT_FOUND_MESSAGE));
        return SubmissionOutcome::SnippetNotFound(question.kind);
    }

    let replaced = source.replacen(&question.snippet, &updated, 1);
    let version = match question.kind {
        CodeKind::Jsx => CodeVersion::new(replaced, session.css_code.clone()),
        CodeKind::Css => CodeVersion::new(session.jsx_code.clone(), replaced),
    };
    session.commit_version(version);
    session.push_message(Message::assistant(format!(
        "I've updated the selected {} code based on your request: \"{}\".",
        question.kind.label(),
        question.query
    )));
    SubmissionOutcome::CodeUpdated(question.kind)
}

fn component_updated(prompt: &str) -> String {
    format!(
        "I've updated the component based on your request: \"{prompt}\". Feel free to provide more feedback."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(jsx: &str, css: &str) -> Session {
        let mut session = Session::new();
        session.replace_history(CodeVersion::new(jsx, css));
        session
    }

    #[test]
    fn test_first_prompt_renames_and_spends_image() {
        let mut session = Session::new();
        session.uploaded_image = Some("data:image/png;base64,AAAA".into());
        let prompt = "A login form with email, password and a remember-me checkbox";

        let dispatch = record_submission(&mut session, prompt, None);

        assert_eq!(session.name, "A login form with email, password and a ...");
        assert!(session.uploaded_image.is_none());
        let user = session.chat_history.last().unwrap();
        assert_eq!(user.image_url.as_deref(), Some("data:image/png;base64,AAAA"));
        match dispatch {
            Dispatch::Generate(input) => {
                assert_eq!(input.image_data_uri.as_deref(), Some("data:image/png;base64,AAAA"))
            }
            _ => panic!("placeholder session must generate"),
        }
    }

    #[test]
    fn test_later_prompt_keeps_name_and_refines() {
        let mut session = session_with("const A = () => <a/>", "a{}");
        session.push_message(Message::user("first", None));
        let name = session.name.clone();

        let dispatch = record_submission(&mut session, "second", None);
        assert_eq!(session.name, name);
        match dispatch {
            Dispatch::Refine(input) => {
                assert_eq!(input.base_component_code, "const A = () => <a/>");
                assert_eq!(input.existing_style_code.as_deref(), Some("a{}"));
            }
            _ => panic!("existing component must refine"),
        }
    }

    #[test]
    fn test_refine_without_css_keeps_previous_css() {
        let mut session = session_with("const A = () => <a/>", "a{color:red}");
        let outcome = merge_reply(
            &mut session,
            "bolder",
            Reply::Refined(RefineOutput {
                refined_component_code: "const A = () => <b/>".into(),
                refined_style_code: None,
            }),
        );
        assert_eq!(outcome, SubmissionOutcome::Refined);
        assert_eq!(session.css_code, "a{color:red}");
        assert_eq!(session.code_history.len(), 2);
    }

    #[test]
    fn test_css_snippet_update() {
        let mut session = session_with("const A = () => <a/>", ".a { color: red; }\n.b {}");
        let question = ScopedQuestion {
            kind: CodeKind::Css,
            snippet: ".a { color: red; }".into(),
            query: "make it blue".into(),
        };
        let outcome = apply_snippet_update(&mut session, &question, ".a { color: blue; }".into());
        assert_eq!(outcome, SubmissionOutcome::CodeUpdated(CodeKind::Css));
        assert_eq!(session.css_code, ".a { color: blue; }\n.b {}");
        assert_eq!(session.jsx_code, "const A = () => <a/>");
        assert_eq!(
            session.chat_history.last().unwrap().content,
            "I've updated the selected CSS code based on your request: \"make it blue\"."
        );
    }

    #[test]
    fn test_missing_snippet_changes_nothing() {
        let mut session = session_with("const A = () => <a/>", "");
        let question = ScopedQuestion {
            kind: CodeKind::Jsx,
            snippet: "<Button/>".into(),
            query: "make it red".into(),
        };
        let outcome = apply_snippet_update(&mut session, &question, "<Button red/>".into());
        assert_eq!(outcome, SubmissionOutcome::SnippetNotFound(CodeKind::Jsx));
        assert_eq!(session.code_history.len(), 1);
        assert_eq!(session.jsx_code, "const A = () => <a/>");
    }
}
