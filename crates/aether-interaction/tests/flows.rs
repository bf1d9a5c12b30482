use aether_core::flow::{
    AskAboutCodeInput, FlowError, GenerateInput, RefineInput, ResponseType, UiFlows,
};
use aether_interaction::AgentUiFlows;
use llm_toolkit::agent::{Agent, AgentError, Payload};
use llm_toolkit::attachment::Attachment;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Replays one canned answer and records every payload it receives.
#[derive(Clone)]
struct ScriptedAgent {
    answer: Option<String>,
    calls: Arc<Mutex<Vec<Payload>>>,
}

impl ScriptedAgent {
    fn answering(answer: &str) -> Self {
        Self {
            answer: Some(answer.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every call with a retryable 500.
    fn overloaded() -> Self {
        Self {
            answer: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<Payload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    type Output = String;

    fn expertise(&self) -> &str {
        "scripted test agent"
    }

    async fn execute(&self, payload: Payload) -> Result<Self::Output, AgentError> {
        self.calls.lock().unwrap().push(payload);
        self.answer.clone().ok_or_else(|| AgentError::ProcessError {
            status_code: Some(500),
            message: "INTERNAL".into(),
            is_retryable: true,
            retry_after: None,
        })
    }
}

fn generate_input(prompt: &str, image: Option<&str>) -> GenerateInput {
    GenerateInput {
        prompt: prompt.to_string(),
        image_data_uri: image.map(str::to_string),
    }
}

#[tokio::test]
async fn test_generate_parses_fenced_json() {
    let agent = ScriptedAgent::answering(
        "```json\n{\"jsxTsxCode\":\"export default function Card() { return <div data-aether-id=\\\"el-1\\\"/> }\",\"cssCode\":\".card{}\"}\n```",
    );
    let flows = AgentUiFlows::new(agent.clone());

    let output = flows.generate(generate_input("a card", None)).await.unwrap();
    assert!(output.component_code.starts_with("export default function Card"));
    assert_eq!(output.style_code, ".card{}");
    assert!(agent.calls()[0].to_text().contains("Prompt: a card"));
}

#[tokio::test]
async fn test_generate_sends_image_inline() {
    let agent = ScriptedAgent::answering(r#"{"jsxTsxCode":"const A = () => <a/>","cssCode":""}"#);
    let flows = AgentUiFlows::new(agent.clone());

    flows
        .generate(generate_input("match this", Some("data:image/jpeg;base64,/9j/4AAQ")))
        .await
        .unwrap();

    let calls = agent.calls();
    assert!(calls[0].has_attachments());
    let attachments = calls[0].attachments();
    assert_eq!(attachments.len(), 1);
    assert_eq!(
        attachments[0],
        &Attachment::in_memory(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
    );
}

#[tokio::test]
async fn test_invalid_input_never_reaches_agent() {
    let agent = ScriptedAgent::answering("{}");
    let flows = AgentUiFlows::new(agent.clone());

    let err = flows.generate(generate_input("  ", None)).await.unwrap_err();
    assert!(matches!(err, FlowError::InvalidInput(_)));
    let err = flows
        .generate(generate_input("x", Some("http://example.com/cat.png")))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::InvalidInput(_)));
    let err = flows
        .ask_about_code(AskAboutCodeInput {
            code_snippet: String::new(),
            user_prompt: "why".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::InvalidInput(_)));

    assert!(agent.calls().is_empty());
}

#[tokio::test]
async fn test_empty_component_is_malformed() {
    let agent = ScriptedAgent::answering(r#"{"jsxTsxCode":"  ","cssCode":"a{}"}"#);
    let flows = AgentUiFlows::new(agent);
    let err = flows.generate(generate_input("x", None)).await.unwrap_err();
    assert!(matches!(err, FlowError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_refine_without_css_keeps_field_absent() {
    let agent = ScriptedAgent::answering(r#"{"refinedComponentCode":"const B = () => <b/>"}"#);
    let flows = AgentUiFlows::new(agent.clone());

    let output = flows
        .refine(RefineInput {
            prompt: "make it bold".into(),
            base_component_code: "const A = () => <a/>".into(),
            existing_style_code: Some("a{color:red}".into()),
            image_data_uri: None,
        })
        .await
        .unwrap();
    assert_eq!(output.refined_component_code, "const B = () => <b/>");
    assert!(output.refined_style_code.is_none());

    let prompt = agent.calls()[0].to_text();
    assert!(prompt.contains("```tsx\nconst A = () => <a/>\n```"));
    assert!(prompt.contains("a{color:red}"));
}

#[tokio::test]
async fn test_ask_about_code_mismatched_field_is_malformed() {
    let agent = ScriptedAgent::answering(r#"{"responseType":"code_update","explanation":"it is red"}"#);
    let flows = AgentUiFlows::new(agent);
    let err = flows
        .ask_about_code(AskAboutCodeInput {
            code_snippet: "a{color:red}".into(),
            user_prompt: "make it blue".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_ask_about_code_explanation() {
    let agent =
        ScriptedAgent::answering(r#"{"responseType":"explanation","explanation":"Sets red text."}"#);
    let flows = AgentUiFlows::new(agent);
    let output = flows
        .ask_about_code(AskAboutCodeInput {
            code_snippet: "a{color:red}".into(),
            user_prompt: "what does this do?".into(),
        })
        .await
        .unwrap();
    assert_eq!(output.response_type, ResponseType::Explanation);
    assert_eq!(output.explanation.as_deref(), Some("Sets red text."));
}

#[tokio::test]
async fn test_agent_failure_is_backend_error() {
    let agent = ScriptedAgent::overloaded();
    let flows = AgentUiFlows::new(agent);
    let err = flows.generate(generate_input("x", None)).await.unwrap_err();
    assert!(matches!(err, FlowError::Backend { retryable: true, .. }));
}
