use crate::error::BackendError;
use serde::{Deserialize, Serialize};

/// Generate-style call as understood by the local daemon.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateCall {
    pub model: String,
    pub prompt: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Chat-style call as understood by the cloud API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[async_trait::async_trait]
pub trait GenerateBackend: Send + Sync + 'static {
    async fn generate(&self, call: GenerateCall) -> Result<String, BackendError>;
}

#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync + 'static {
    async fn chat(&self, call: ChatCall) -> Result<String, BackendError>;
}

/// Pull a human readable reason out of an error body, falling back to the raw text.
pub(crate) fn upstream_reason(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<serde_json::Value>,
    }
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(serde_json::Value::String(s)) }) => s,
        Ok(ErrorBody { error: Some(other) }) => other
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
        _ => String::from_utf8_lossy(body).trim().to_string(),
    }
}

pub mod cloud;
pub mod ollama;
