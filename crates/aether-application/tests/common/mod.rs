#![allow(dead_code)]

use aether_application::{Clipboard, RefinementOrchestrator, SessionService};
use aether_core::error::{AetherError, Result};
use aether_core::flow::{
    AskAboutCodeInput, AskAboutCodeOutput, FlowError, FlowResult, GenerateInput, GenerateOutput,
    RefineInput, RefineOutput, ResponseType, UiFlows,
};
use aether_core::notification::{Notification, Notifier};
use aether_core::session::{SessionSnapshot, SessionSnapshotRepository, SessionStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Snapshot repository kept in memory.
#[derive(Default)]
pub struct InMemoryRepository {
    pub saved: Mutex<Option<SessionSnapshot>>,
    pub fail_saves: AtomicBool,
    pub fail_loads: AtomicBool,
}

#[async_trait]
impl SessionSnapshotRepository for InMemoryRepository {
    async fn load(&self) -> Result<SessionSnapshot> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(AetherError::io("corrupt sessions file"));
        }
        Ok(self.saved.lock().unwrap().clone().unwrap_or_default())
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(AetherError::io("disk full"));
        }
        *self.saved.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}

/// Clipboard that records what it was given, or refuses like a headless host.
#[derive(Default)]
pub struct RecordingClipboard {
    pub texts: Mutex<Vec<String>>,
    pub unavailable: AtomicBool,
}

impl Clipboard for RecordingClipboard {
    fn set_text(&self, text: &str) -> std::result::Result<(), String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err("no display server".to_string());
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct CollectingNotifier {
    pub received: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.received.lock().unwrap().last().cloned()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.lock().unwrap().push(notification);
    }
}

/// Flows answering from per-contract queues.
///
/// With a gate installed, every call signals `entered` and then waits for
/// `release` before answering.
#[derive(Default)]
pub struct ScriptedFlows {
    pub generate: Mutex<VecDeque<FlowResult<GenerateOutput>>>,
    pub refine: Mutex<VecDeque<FlowResult<RefineOutput>>>,
    pub ask: Mutex<VecDeque<FlowResult<AskAboutCodeOutput>>>,
    pub generate_inputs: Mutex<Vec<GenerateInput>>,
    pub refine_inputs: Mutex<Vec<RefineInput>>,
    pub ask_inputs: Mutex<Vec<AskAboutCodeInput>>,
    pub gate: Option<Gate>,
}

pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl ScriptedFlows {
    pub fn gated() -> Self {
        Self {
            gate: Some(Gate {
                entered: Notify::new(),
                release: Notify::new(),
            }),
            ..Self::default()
        }
    }

    pub fn push_generate(&self, jsx: &str, css: &str) {
        self.generate.lock().unwrap().push_back(Ok(GenerateOutput {
            component_code: jsx.to_string(),
            style_code: css.to_string(),
        }));
    }

    pub fn push_refine(&self, jsx: &str, css: Option<&str>) {
        self.refine.lock().unwrap().push_back(Ok(RefineOutput {
            refined_component_code: jsx.to_string(),
            refined_style_code: css.map(str::to_string),
        }));
    }

    pub fn push_generate_error(&self) {
        self.generate
            .lock()
            .unwrap()
            .push_back(Err(FlowError::backend("503 Service Unavailable", true)));
    }

    pub fn push_explanation(&self, text: &str) {
        self.ask.lock().unwrap().push_back(Ok(AskAboutCodeOutput {
            response_type: ResponseType::Explanation,
            explanation: Some(text.to_string()),
            updated_code: None,
        }));
    }

    pub fn push_code_update(&self, code: &str) {
        self.ask.lock().unwrap().push_back(Ok(AskAboutCodeOutput {
            response_type: ResponseType::CodeUpdate,
            explanation: None,
            updated_code: Some(code.to_string()),
        }));
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

fn exhausted<T>() -> FlowResult<T> {
    Err(FlowError::malformed("no scripted reply"))
}

#[async_trait]
impl UiFlows for ScriptedFlows {
    async fn generate(&self, input: GenerateInput) -> FlowResult<GenerateOutput> {
        self.generate_inputs.lock().unwrap().push(input);
        self.pass_gate().await;
        let next = self.generate.lock().unwrap().pop_front();
        next.unwrap_or_else(exhausted)
    }

    async fn refine(&self, input: RefineInput) -> FlowResult<RefineOutput> {
        self.refine_inputs.lock().unwrap().push(input);
        self.pass_gate().await;
        let next = self.refine.lock().unwrap().pop_front();
        next.unwrap_or_else(exhausted)
    }

    async fn ask_about_code(&self, input: AskAboutCodeInput) -> FlowResult<AskAboutCodeOutput> {
        self.ask_inputs.lock().unwrap().push(input);
        self.pass_gate().await;
        let next = self.ask.lock().unwrap().pop_front();
        next.unwrap_or_else(exhausted)
    }
}

pub struct Harness {
    pub repository: Arc<InMemoryRepository>,
    pub notifier: Arc<CollectingNotifier>,
    pub clipboard: Arc<RecordingClipboard>,
    pub flows: Arc<ScriptedFlows>,
    pub sessions: Arc<SessionService>,
    pub orchestrator: Arc<RefinementOrchestrator>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_flows(ScriptedFlows::default())
    }

    pub fn with_flows(flows: ScriptedFlows) -> Self {
        let repository = Arc::new(InMemoryRepository::default());
        let notifier = Arc::new(CollectingNotifier::default());
        let clipboard = Arc::new(RecordingClipboard::default());
        let flows = Arc::new(flows);
        let sessions = Arc::new(
            SessionService::new(SessionStore::new(), repository.clone(), notifier.clone())
                .with_clipboard(clipboard.clone()),
        );
        let orchestrator = Arc::new(RefinementOrchestrator::new(sessions.clone(), flows.clone()));
        Self {
            repository,
            notifier,
            clipboard,
            flows,
            sessions,
            orchestrator,
        }
    }

    /// Generates a first component so later prompts refine.
    pub async fn seed_component(&self, jsx: &str, css: &str) {
        self.flows.push_generate(jsx, css);
        self.orchestrator.submit("seed component").await.unwrap();
    }
}
