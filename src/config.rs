use crate::constants::{
    ANTHROPIC_ENDPOINT, ANTHROPIC_MODEL, GROQ_ENDPOINT, GROQ_MODEL, OPENAI_ENDPOINT, OPENAI_MODEL,
};
use crate::error::Error;
use std::fmt;

/// supported completion providers, in fallback priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Groq,
    OpenAi,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Groq, Provider::OpenAi, Provider::Anthropic];

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// prefix of the environment variables configuring this provider
    fn env_prefix(self) -> &'static str {
        match self {
            Provider::Groq => "GROQ",
            Provider::OpenAi => "OPENAI",
            Provider::Anthropic => "ANTHROPIC",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Provider::Groq => GROQ_ENDPOINT,
            Provider::OpenAi => OPENAI_ENDPOINT,
            Provider::Anthropic => ANTHROPIC_ENDPOINT,
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Groq => GROQ_MODEL,
            Provider::OpenAi => OPENAI_MODEL,
            Provider::Anthropic => ANTHROPIC_MODEL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// one configured backend
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub provider: Provider,
    pub endpoint: String,
    /// explicit model override; None uses the provider's built-in choice
    pub model: Option<String>,
    pub api_key: String,
}

// keep the key out of debug output
impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// backends with a credential, in priority order
#[derive(Debug, Clone)]
pub struct Config {
    pub backends: Vec<BackendConfig>,
}

impl Config {
    /// read configuration from the process environment
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// read configuration through `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: String| {
            lookup(&key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backends: Vec<BackendConfig> = Provider::ALL
            .into_iter()
            .filter_map(|provider| {
                let prefix = provider.env_prefix();
                let api_key = get(format!("{prefix}_API_KEY"))?;
                Some(BackendConfig {
                    provider,
                    endpoint: get(format!("{prefix}_API_BASE"))
                        .unwrap_or_else(|| provider.default_endpoint().to_string()),
                    model: get(format!("{prefix}_MODEL")),
                    api_key,
                })
            })
            .collect();

        if backends.is_empty() {
            return Err(Error::Configuration);
        }
        Ok(Self { backends })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_no_credentials_is_a_configuration_error() {
        let result = Config::from_lookup(lookup(&[("GROQ_MODEL", "some-model")]));
        assert!(matches!(result, Err(Error::Configuration)));
    }

    #[test]
    fn test_empty_credential_counts_as_unset() {
        let result = Config::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")]));
        assert!(matches!(result, Err(Error::Configuration)));
    }

    #[test]
    fn test_backends_follow_priority_order() {
        let config = Config::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "a-key"),
            ("GROQ_API_KEY", "g-key"),
        ]))
        .unwrap();

        let providers: Vec<Provider> = config.backends.iter().map(|b| b.provider).collect();
        assert_eq!(providers, vec![Provider::Groq, Provider::Anthropic]);
        assert_eq!(config.backends[0].endpoint, GROQ_ENDPOINT);
        assert_eq!(config.backends[0].model, None);
        assert_eq!(config.backends[1].api_key, "a-key");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "o-key"),
            ("OPENAI_API_BASE", "http://localhost:8080/v1/chat/completions"),
            ("OPENAI_MODEL", "local-model"),
        ]))
        .unwrap();

        let backend = &config.backends[0];
        assert_eq!(backend.provider, Provider::OpenAi);
        assert_eq!(backend.endpoint, "http://localhost:8080/v1/chat/completions");
        assert_eq!(backend.model.as_deref(), Some("local-model"));
    }

    #[test]
    fn test_debug_output_hides_key() {
        let config = Config::from_lookup(lookup(&[("GROQ_API_KEY", "secret-value")])).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-value"));
        assert!(debug.contains("<redacted>"));
    }
}
