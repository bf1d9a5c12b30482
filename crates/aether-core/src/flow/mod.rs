//! AI flow contracts.
//!
//! Three request/response contracts with the generative backend: Generate,
//! Refine and Ask-About-Code. Each wraps exactly one round trip. Inputs are
//! checked before any network call and outputs are checked after parsing;
//! an invalid response is treated exactly like a hard failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single flow round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The request was rejected before reaching the backend.
    #[error("invalid flow input: {0}")]
    InvalidInput(String),

    /// Network, HTTP or backend-side failure.
    #[error("backend failure: {message}")]
    Backend { message: String, retryable: bool },

    /// The backend answered, but not with a schema-conformant response.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl FlowError {
    pub fn backend(message: impl Into<String>, retryable: bool) -> Self {
        Self::Backend {
            message: message.into(),
            retryable,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { retryable: true, .. })
    }
}

pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// A `data:<mime>;base64,<payload>` image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mime_type: &'a str,
    pub data: &'a str,
}

impl<'a> DataUri<'a> {
    /// Splits a base64 data URI into its MIME type and payload.
    pub fn parse(uri: &'a str) -> FlowResult<Self> {
        let invalid = || FlowError::InvalidInput("image must be a base64 data URI".to_string());
        let rest = uri.strip_prefix("data:").ok_or_else(invalid)?;
        let (meta, data) = rest.split_once(',').ok_or_else(invalid)?;
        let mime_type = meta.strip_suffix(";base64").ok_or_else(invalid)?;
        if mime_type.is_empty() || !mime_type.contains('/') || data.is_empty() {
            return Err(invalid());
        }
        Ok(Self { mime_type, data })
    }
}

fn require_text(field: &str, value: &str) -> FlowResult<()> {
    if value.trim().is_empty() {
        return Err(FlowError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn check_image(image: Option<&str>) -> FlowResult<()> {
    image.map(DataUri::parse).transpose().map(|_| ())
}

// ============================================================================
// Generate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInput {
    pub prompt: String,
    pub image_data_uri: Option<String>,
}

impl GenerateInput {
    pub fn validate(&self) -> FlowResult<()> {
        require_text("prompt", &self.prompt)?;
        check_image(self.image_data_uri.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOutput {
    #[serde(rename = "jsxTsxCode")]
    pub component_code: String,
    #[serde(rename = "cssCode")]
    pub style_code: String,
}

impl GenerateOutput {
    pub fn validate(&self) -> FlowResult<()> {
        if self.component_code.trim().is_empty() {
            return Err(FlowError::malformed("jsxTsxCode is empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Refine
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineInput {
    pub prompt: String,
    pub base_component_code: String,
    pub existing_style_code: Option<String>,
    pub image_data_uri: Option<String>,
}

impl RefineInput {
    pub fn validate(&self) -> FlowResult<()> {
        require_text("prompt", &self.prompt)?;
        require_text("base component code", &self.base_component_code)?;
        check_image(self.image_data_uri.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineOutput {
    #[serde(rename = "refinedComponentCode")]
    pub refined_component_code: String,
    /// Absent when the stylesheet needs no change.
    #[serde(rename = "refinedCss", default, skip_serializing_if = "Option::is_none")]
    pub refined_style_code: Option<String>,
}

impl RefineOutput {
    pub fn validate(&self) -> FlowResult<()> {
        if self.refined_component_code.trim().is_empty() {
            return Err(FlowError::malformed("refinedComponentCode is empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Ask about code
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskAboutCodeInput {
    pub code_snippet: String,
    pub user_prompt: String,
}

impl AskAboutCodeInput {
    pub fn validate(&self) -> FlowResult<()> {
        require_text("code snippet", &self.code_snippet)?;
        require_text("user prompt", &self.user_prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Explanation,
    CodeUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskAboutCodeOutput {
    pub response_type: ResponseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_code: Option<String>,
}

impl AskAboutCodeOutput {
    /// Requires the field matching `response_type` to be populated and the
    /// other one to be absent.
    pub fn validate(&self) -> FlowResult<()> {
        let (populated, other, other_name) = match self.response_type {
            ResponseType::Explanation => (
                self.explanation.as_deref(),
                self.updated_code.as_deref(),
                "updatedCode",
            ),
            ResponseType::CodeUpdate => (
                self.updated_code.as_deref(),
                self.explanation.as_deref(),
                "explanation",
            ),
        };
        if other.is_some() {
            return Err(FlowError::malformed(format!(
                "responseType {:?} must not carry {}",
                self.response_type, other_name
            )));
        }
        match populated {
            Some(text) if !text.trim().is_empty() => Ok(()),
            _ => Err(FlowError::malformed(format!(
                "responseType {:?} without its matching field",
                self.response_type
            ))),
        }
    }
}

/// The three backend contracts.
///
/// Implementations validate the input before any network call and return
/// only fully validated outputs.
#[async_trait]
pub trait UiFlows: Send + Sync {
    async fn generate(&self, input: GenerateInput) -> FlowResult<GenerateOutput>;

    async fn refine(&self, input: RefineInput) -> FlowResult<RefineOutput>;

    async fn ask_about_code(&self, input: AskAboutCodeInput) -> FlowResult<AskAboutCodeOutput>;
}
