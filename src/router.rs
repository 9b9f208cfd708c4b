//! Per-request backend selection and response normalization.
//!
//! A model name containing `cloud` anywhere goes to the cloud chat API, every
//! other name goes to the local daemon. Before a cloud call the first `-cloud`
//! is removed from the name, so `cloudy` is sent upstream unchanged.

use crate::error::BackendError;
use crate::model::{ChatBackend, ChatCall, ChatMessage, GenerateBackend, GenerateCall};
use serde::Serialize;
use std::sync::Arc;

pub const EMPTY_PROMPT: &str = "Please enter a prompt.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendTarget {
    Local,
    Cloud,
}

impl BackendTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendTarget::Local => "local",
            BackendTarget::Cloud => "cloud",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub generated_text: String,
}

pub fn classify(model_name: &str) -> BackendTarget {
    if model_name.contains("cloud") {
        BackendTarget::Cloud
    } else {
        BackendTarget::Local
    }
}

/// Model identifier sent upstream for a cloud-routed name.
pub fn upstream_cloud_model(model_name: &str) -> String {
    model_name.replacen("-cloud", "", 1)
}

pub struct RequestRouter {
    local: Arc<dyn GenerateBackend>,
    cloud: Option<Arc<dyn ChatBackend>>,
    default_model: String,
}

impl RequestRouter {
    /// `cloud` is `None` when no credential was configured; cloud-routed
    /// requests then fail with `Unconfigured` without touching the network.
    pub fn new(
        local: Arc<dyn GenerateBackend>,
        cloud: Option<Arc<dyn ChatBackend>>,
        default_model: impl Into<String>,
    ) -> Self {
        Self { local, cloud, default_model: default_model.into() }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn cloud_configured(&self) -> bool {
        self.cloud.is_some()
    }

    /// Model name that `route` will use for the given (possibly omitted) name.
    pub fn resolve_model<'a>(&'a self, model_name: Option<&'a str>) -> &'a str {
        model_name.unwrap_or(&self.default_model)
    }

    pub async fn route(
        &self,
        prompt: &str,
        model_name: Option<&str>,
    ) -> Result<GenerationResult, BackendError> {
        if prompt.is_empty() {
            return Err(BackendError::InvalidInput(EMPTY_PROMPT.to_string()));
        }
        let model_name = self.resolve_model(model_name);

        let generated_text = match classify(model_name) {
            BackendTarget::Cloud => {
                let cloud = self.cloud.as_ref().ok_or_else(|| {
                    BackendError::Unconfigured(format!(
                        "model '{model_name}' needs the cloud backend but OLLAMA_API_KEY is not set"
                    ))
                })?;
                let call = ChatCall {
                    model: upstream_cloud_model(model_name),
                    messages: vec![ChatMessage::user(prompt)],
                };
                cloud.chat(call).await?
            }
            BackendTarget::Local => {
                let call = GenerateCall { model: model_name.to_string(), prompt: prompt.to_string() };
                self.local.generate(call).await?
            }
        };
        Ok(GenerationResult { generated_text })
    }

    /// String-only surface for interactive callers: the generated text, or an
    /// error line they can show as-is.
    pub async fn generate_text(&self, prompt: &str, model_name: Option<&str>) -> String {
        match self.route(prompt, model_name).await {
            Ok(r) => r.generated_text,
            Err(BackendError::InvalidInput(m)) => m,
            Err(e) => format!("Error: {e}"),
        }
    }
}
