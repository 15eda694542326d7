//! Completion backends.
//!
//! Every provider is reached through the same small trait so the message
//! generator can walk an ordered list of them without caring which is which.

mod anthropic;
mod openai;

pub use anthropic::AnthropicBackend;
pub use openai::ChatBackend;

use crate::config::{BackendConfig, Provider};
use crate::error::BackendError;

/// one request to a completion service
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
}

pub trait CompletionBackend {
    /// short name used in logs and errors
    fn name(&self) -> &str;

    /// model to use for a diff of `diff_chars` characters
    fn model_for(&self, diff_chars: usize) -> String;

    /// send the request and return the first answer's text
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, BackendError>;
}

/// instantiate a backend for every configured provider, keeping their order
pub fn build_backends(configs: &[BackendConfig]) -> Vec<Box<dyn CompletionBackend>> {
    configs
        .iter()
        .map(|config| -> Box<dyn CompletionBackend> {
            match config.provider {
                Provider::Groq | Provider::OpenAi => Box::new(ChatBackend::new(config.clone())),
                Provider::Anthropic => Box::new(AnthropicBackend::new(config.clone())),
            }
        })
        .collect()
}
