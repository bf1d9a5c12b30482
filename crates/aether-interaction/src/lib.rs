//! Generative backend access for Aether.

pub mod flows;
pub mod gemini_api_agent;
pub mod prompts;

pub use flows::AgentUiFlows;
pub use gemini_api_agent::GeminiApiAgent;
