use super::{upstream_reason, GenerateBackend, GenerateCall};
use crate::error::BackendError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const NAME: &str = "local backend";

#[derive(Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateReply {
    response: Option<String>,
}

/// Client for a locally running model daemon (`POST /api/generate`).
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    base_url: String,
}

impl OllamaBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait::async_trait]
impl GenerateBackend for OllamaBackend {
    async fn generate(&self, call: GenerateCall) -> Result<String, BackendError> {
        let body = GenerateBody { model: &call.model, prompt: &call.prompt, stream: false };
        tracing::debug!(model = %call.model, url = %self.generate_url(), "local generate");

        let resp = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    BackendError::Unreachable(format!(
                        "could not connect to the local server at {}; is it running? ({e})",
                        self.base_url
                    ))
                } else {
                    BackendError::from_transport(NAME, e)
                }
            })?;

        let status = resp.status();
        let bytes = resp.bytes().await.map_err(|e| BackendError::from_transport(NAME, e))?;
        if !status.is_success() {
            return Err(BackendError::UpstreamFailure(format!(
                "{NAME} returned {status}: {}",
                upstream_reason(&bytes)
            )));
        }

        let reply: GenerateReply = serde_json::from_slice(&bytes).map_err(|e| {
            BackendError::UpstreamFailure(format!("{NAME} returned a malformed body: {e}"))
        })?;
        Ok(reply.response.unwrap_or_default())
    }
}
