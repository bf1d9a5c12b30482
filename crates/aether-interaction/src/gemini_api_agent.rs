//! GeminiApiAgent - REST implementation of [`Agent`] for Gemini.
//!
//! Requests are sent to `{base_url}/{model}:generateContent` with JSON output
//! forced through `generationConfig.responseMimeType`.

use aether_core::config::{BackendConfig, SecretConfig};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use llm_toolkit::agent::{Agent, AgentError, Payload};
use llm_toolkit::attachment::Attachment;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const JSON_MIME_TYPE: &str = "application/json";

/// Agent implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiAgent {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiApiAgent {
    /// Builds the agent from `[backend]` settings and the loaded secrets.
    ///
    /// `secret.json`'s `model_name` wins over the configured model.
    pub fn from_config(backend: &BackendConfig, secrets: &SecretConfig) -> Result<Self, AgentError> {
        let gemini = secrets.gemini.as_ref().ok_or_else(|| {
            AgentError::ExecutionFailed(
                "Gemini API key not configured (secret.json or GEMINI_API_KEY)".to_string(),
            )
        })?;
        if gemini.api_key.trim().is_empty() {
            return Err(AgentError::ExecutionFailed("Gemini API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(backend.timeout_secs))
            .build()
            .map_err(|err| AgentError::ExecutionFailed(format!("Failed to build HTTP client: {err}")))?;

        let model = gemini
            .model_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| backend.model.clone());

        Ok(Self {
            client,
            api_key: gemini.api_key.clone(),
            model,
            base_url: backend.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn build_parts(payload: &Payload) -> Result<Vec<Part>, AgentError> {
        let mut parts = Vec::new();
        let text = payload.to_text();
        if !text.trim().is_empty() {
            parts.push(Part::Text { text });
        }

        for attachment in payload.attachments() {
            parts.push(Self::attachment_to_part(attachment).await?);
        }

        if parts.is_empty() {
            return Err(AgentError::ExecutionFailed(
                "Gemini payload must include text or images".into(),
            ));
        }

        Ok(parts)
    }

    async fn attachment_to_part(attachment: &Attachment) -> Result<Part, AgentError> {
        if let Attachment::Remote(_) = attachment {
            return Err(AgentError::ExecutionFailed(
                "Remote attachments are not supported for Gemini API".into(),
            ));
        }

        let bytes = attachment.load_bytes().await.map_err(|err| {
            AgentError::ExecutionFailed(format!("Failed to load attachment for Gemini API: {err}"))
        })?;

        let mime_type = attachment
            .mime_type()
            .or_else(|| sniff_image_mime(&bytes).map(str::to_string))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Ok(Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type,
                data: BASE64_STANDARD.encode(bytes),
            },
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        )
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, AgentError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(body)
            .send()
            .await
            .map_err(|err| {
                let is_retryable = err.is_connect() || err.is_timeout();
                AgentError::ProcessError {
                    status_code: None,
                    // the query string carries the key
                    message: format!("Gemini API request failed: {}", err.without_url()),
                    is_retryable,
                    retry_after: None,
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| {
                AgentError::Other(format!(
                    "Failed to parse Gemini response: {}",
                    err.without_url()
                ))
            })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl Agent for GeminiApiAgent {
    type Output = String;

    fn expertise(&self) -> &str {
        "Gemini API agent for UI component generation"
    }

    async fn execute(&self, payload: Payload) -> Result<Self::Output, AgentError> {
        let contents = vec![Content {
            role: "user".to_string(),
            parts: Self::build_parts(&payload).await?,
        }];

        let request = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE.to_string(),
            },
        };
        tracing::debug!("Sending Gemini request to model {}", self.model);
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, AgentError> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .ok_or_else(|| {
            AgentError::ExecutionFailed(
                "Gemini API returned no text in the response candidates".into(),
            )
        })
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> AgentError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    AgentError::ProcessError {
        status_code: Some(status.as_u16()),
        message,
        is_retryable,
        retry_after,
    }
}

/// In-memory attachments carry no mime type; recognise the image formats
/// the uploader accepts from their magic bytes.
fn sniff_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date form is not supported
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
