//! The reasoning backend: one conversation in, one assistant message out.

mod openai;

pub use openai::{OpenAiBackend, OpenAiConfig};

use crate::{model::Message, tools::ToolSchema};

/// Errors talking to the reasoning backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("missing API key")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One completion request.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub tools: &'a [ToolSchema],

    /// Determinism hint. Lookout always asks for 0.0.
    pub temperature: f32,
}

/// A reasoning backend. Each call returns exactly one assistant message,
/// optionally carrying tool-call requests.
pub trait Backend {
    fn complete(&self, request: &ChatRequest<'_>) -> Result<Message, BackendError>;
}
