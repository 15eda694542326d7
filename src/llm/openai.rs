//! OpenAI-compatible chat completions, used for both Groq and OpenAI.

use super::{CompletionBackend, CompletionRequest};
use crate::config::{BackendConfig, Provider};
use crate::constants::{
    CHARS_PER_TOKEN, GROQ_CONTEXT_TOKENS, GROQ_LARGE_DIFF_MODEL, MAX_RESPONSE_TOKENS, TEMPERATURE,
};
use crate::error::BackendError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, BackendError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)
    }
}

pub struct ChatBackend {
    config: BackendConfig,
}

impl ChatBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }
}

impl CompletionBackend for ChatBackend {
    fn name(&self) -> &str {
        self.config.provider.as_str()
    }

    fn model_for(&self, diff_chars: usize) -> String {
        if let Some(model) = &self.config.model {
            return model.clone();
        }
        // the preferred groq model has a tight token budget
        if self.config.provider == Provider::Groq
            && diff_chars > GROQ_CONTEXT_TOKENS * CHARS_PER_TOKEN
        {
            return GROQ_LARGE_DIFF_MODEL.to_string();
        }
        self.config.provider.default_model().to_string()
    }

    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, BackendError> {
        let body = ChatRequest {
            model: request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system,
                },
                ChatMessage {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_RESPONSE_TOKENS,
        };

        let mut response = ureq::post(self.config.endpoint.as_str())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send_json(&body)?;
        let parsed: ChatResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GROQ_MODEL;

    fn backend(provider: Provider, model: Option<&str>) -> ChatBackend {
        ChatBackend::new(BackendConfig {
            provider,
            endpoint: provider.default_endpoint().to_string(),
            model: model.map(str::to_string),
            api_key: "key".to_string(),
        })
    }

    #[test]
    fn test_groq_model_depends_on_diff_size() {
        let groq = backend(Provider::Groq, None);
        let threshold = GROQ_CONTEXT_TOKENS * CHARS_PER_TOKEN;

        assert_eq!(groq.model_for(0), GROQ_MODEL);
        assert_eq!(groq.model_for(threshold), GROQ_MODEL);
        assert_eq!(groq.model_for(threshold + 1), GROQ_LARGE_DIFF_MODEL);
    }

    #[test]
    fn test_model_override_wins() {
        let groq = backend(Provider::Groq, Some("my-model"));
        assert_eq!(groq.model_for(1_000_000), "my-model");
    }

    #[test]
    fn test_openai_ignores_diff_size() {
        let openai = backend(Provider::OpenAi, None);
        assert_eq!(openai.model_for(1_000_000), Provider::OpenAi.default_model());
    }

    #[test]
    fn test_request_shape() {
        let body = ChatRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "diff",
                },
            ],
            temperature: 0.5,
            max_tokens: 10,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "diff"},
                ],
                "temperature": 0.5,
                "max_tokens": 10,
            })
        );
    }

    #[test]
    fn test_first_choice_is_used() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [
                {"message": {"role": "assistant", "content": "Fix typo"}},
                {"message": {"role": "assistant", "content": "Other"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "Fix typo");
    }

    #[test]
    fn test_no_choices_is_a_failure() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(BackendError::EmptyResponse)
        ));

        let response: ChatResponse = serde_json::from_str(r#"{"id": "x"}"#).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(BackendError::EmptyResponse)
        ));

        let response: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert!(response.into_text().is_err());
    }
}
