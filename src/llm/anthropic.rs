//! Anthropic messages API.

use super::{CompletionBackend, CompletionRequest};
use crate::config::BackendConfig;
use crate::constants::{ANTHROPIC_VERSION, MAX_RESPONSE_TOKENS, TEMPERATURE};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    fn into_text(self) -> Result<String, BackendError> {
        self.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)
    }
}

pub struct AnthropicBackend {
    config: BackendConfig,
}

impl AnthropicBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

impl CompletionBackend for AnthropicBackend {
    fn name(&self) -> &str {
        self.config.provider.as_str()
    }

    fn model_for(&self, _diff_chars: usize) -> String {
        self.config
            .model
            .clone()
            .unwrap_or_else(|| self.config.provider.default_model().to_string())
    }

    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, BackendError> {
        let body = MessagesRequest {
            model: request.model,
            max_tokens: MAX_RESPONSE_TOKENS,
            temperature: TEMPERATURE,
            system: request.system,
            messages: [Message {
                role: "user",
                content: request.user,
            }],
        };

        let mut response = ureq::post(self.config.endpoint.as_str())
            .header("x-api-key", self.config.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send_json(&body)?;
        let parsed: MessagesResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        parsed.into_text()
    }
}
