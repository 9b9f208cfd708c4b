use super::{upstream_reason, ChatBackend, ChatCall, ChatMessage};
use crate::error::BackendError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const NAME: &str = "cloud backend";

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatReply {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Authenticated chat API (`POST /api/chat` with a bearer credential).
#[derive(Clone)]
pub struct CloudBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CloudBackend {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url, api_key: api_key.into() }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

impl std::fmt::Debug for CloudBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudBackend")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait::async_trait]
impl ChatBackend for CloudBackend {
    async fn chat(&self, call: ChatCall) -> Result<String, BackendError> {
        let body = ChatBody { model: &call.model, messages: &call.messages, stream: false };
        tracing::debug!(model = %call.model, url = %self.chat_url(), "cloud chat");

        let resp = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::from_transport(NAME, e))?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| BackendError::from_transport(NAME, e))?;
        if !status.is_success() {
            return Err(BackendError::UpstreamFailure(format!(
                "{NAME} returned {status}: {}",
                upstream_reason(&bytes)
            )));
        }

        let reply: ChatReply = serde_json::from_slice(&bytes).map_err(|e| {
            BackendError::UpstreamFailure(format!("{NAME} returned a malformed body: {e}"))
        })?;
        reply
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| BackendError::UpstreamFailure(format!("{NAME} reply had no message content")))
    }
}
