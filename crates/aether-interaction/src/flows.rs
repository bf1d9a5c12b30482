//! [`UiFlows`] implemented on top of an [`Agent`].
//!
//! Each flow renders its prompt, makes exactly one agent call, then parses and
//! validates the JSON answer. Nothing is retried here.

use crate::prompts;
use aether_core::flow::{
    AskAboutCodeInput, AskAboutCodeOutput, DataUri, FlowError, FlowResult, GenerateInput,
    GenerateOutput, RefineInput, RefineOutput, UiFlows,
};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use llm_toolkit::agent::{Agent, AgentError, Payload};
use llm_toolkit::attachment::Attachment;
use serde::de::DeserializeOwned;

pub struct AgentUiFlows<A> {
    agent: A,
}

impl<A: Agent<Output = String>> AgentUiFlows<A> {
    pub fn new(agent: A) -> Self {
        Self { agent }
    }

    async fn round_trip<T: DeserializeOwned>(
        &self,
        flow: &str,
        text: String,
        image: Option<&str>,
    ) -> FlowResult<T> {
        let mut payload = Payload::text(text);
        if let Some(uri) = image {
            payload = payload.with_attachment(image_attachment(uri)?);
        }

        tracing::info!("Dispatching {} flow via {}", flow, self.agent.expertise());
        let raw = self.agent.execute(payload).await.map_err(|e| {
            tracing::error!("{} flow failed: {}", flow, e);
            flow_error(e)
        })?;
        parse_json_response(&raw)
    }
}

/// Decodes a data URI into an in-memory attachment.
fn image_attachment(uri: &str) -> FlowResult<Attachment> {
    let parsed = DataUri::parse(uri)?;
    let bytes = BASE64_STANDARD
        .decode(parsed.data)
        .map_err(|e| FlowError::InvalidInput(format!("image payload is not valid base64: {e}")))?;
    Ok(Attachment::in_memory(bytes))
}

fn flow_error(error: AgentError) -> FlowError {
    let retryable = matches!(
        error,
        AgentError::ProcessError {
            is_retryable: true,
            ..
        }
    );
    FlowError::backend(error.to_string(), retryable)
}

fn prompt_error(error: minijinja::Error) -> FlowError {
    FlowError::InvalidInput(format!("failed to render prompt: {error}"))
}

/// Parses the model's JSON answer, tolerating a surrounding ```json fence.
pub fn parse_json_response<T: DeserializeOwned>(raw: &str) -> FlowResult<T> {
    serde_json::from_str(strip_json_fence(raw))
        .map_err(|e| FlowError::malformed(format!("response does not match schema: {e}")))
}

fn strip_json_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[async_trait]
impl<A: Agent<Output = String>> UiFlows for AgentUiFlows<A> {
    async fn generate(&self, input: GenerateInput) -> FlowResult<GenerateOutput> {
        input.validate()?;
        let text = prompts::render_generate(&input.prompt, input.image_data_uri.is_some())
            .map_err(prompt_error)?;

        let output: GenerateOutput = self
            .round_trip("generate", text, input.image_data_uri.as_deref())
            .await?;
        output.validate()?;
        Ok(output)
    }

    async fn refine(&self, input: RefineInput) -> FlowResult<RefineOutput> {
        input.validate()?;
        let text = prompts::render_refine(
            &input.prompt,
            &input.base_component_code,
            input.existing_style_code.as_deref(),
            input.image_data_uri.is_some(),
        )
        .map_err(prompt_error)?;

        let output: RefineOutput = self
            .round_trip("refine", text, input.image_data_uri.as_deref())
            .await?;
        output.validate()?;
        Ok(output)
    }

    async fn ask_about_code(&self, input: AskAboutCodeInput) -> FlowResult<AskAboutCodeOutput> {
        input.validate()?;
        let text = prompts::render_ask_about_code(&input.code_snippet, &input.user_prompt)
            .map_err(prompt_error)?;

        let output: AskAboutCodeOutput = self.round_trip("ask_about_code", text, None).await?;
        output.validate()?;
        Ok(output)
    }
}
