//! LLM client configuration.

use serde::{Deserialize, Serialize};

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI-compatible chat completions API (OpenAI, Groq, Together.ai, etc.)
    #[default]
    OpenAI,
    /// Ollama API (local)
    Ollama,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "openai" | "groq" | "together" => Some(Self::OpenAI),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    /// Endpoint used when none is configured.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com",
            Self::Ollama => "http://localhost:11434",
        }
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider (openai or ollama)
    #[serde(default)]
    pub provider: LlmProvider,
    /// API endpoint (provider-specific default when unset)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// API key for OpenAI-compatible providers
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Model to use for generation
    #[serde(default = "default_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            endpoint: None,
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `LLM_PROVIDER`: "openai" (default), "groq", "together", or "ollama"
    /// - `LLM_ENDPOINT`: API endpoint (defaults based on provider)
    /// - `LLM_API_KEY`: API key, wins over provider-specific keys
    /// - `OPENAI_API_KEY` / `GROQ_API_KEY`: provider-specific keys
    /// - `LLM_MODEL`: Model name
    /// - `LLM_TIMEOUT_SECS`: Request timeout
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit_provider = lookup("LLM_PROVIDER");
        if let Some(provider) = explicit_provider.as_deref().and_then(LlmProvider::from_str) {
            self.provider = provider;
        }

        if let Some(endpoint) = lookup("LLM_ENDPOINT") {
            self.endpoint = Some(endpoint);
        } else if let Some(provider_str) = explicit_provider.as_deref() {
            match provider_str.to_lowercase().as_str() {
                "groq" => self.endpoint = Some("https://api.groq.com/openai".to_string()),
                "together" => self.endpoint = Some("https://api.together.xyz".to_string()),
                _ => {}
            }
        }

        // Explicit API key always wins
        let provider_key = match explicit_provider.as_deref().map(str::to_lowercase).as_deref() {
            Some("groq") => lookup("GROQ_API_KEY"),
            _ => lookup("OPENAI_API_KEY"),
        };
        if let Some(key) = lookup("LLM_API_KEY").or(provider_key) {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }

        if let Some(val) = lookup("LLM_MODEL") {
            self.model = val;
        }
        if let Some(n) = lookup("LLM_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = n;
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Endpoint to call, falling back to the provider default.
    pub fn effective_endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
            .trim_end_matches('/')
    }

    /// Whether a request can be authenticated for this provider.
    pub fn has_credentials(&self) -> bool {
        match self.provider {
            LlmProvider::OpenAI => self.api_key.is_some(),
            LlmProvider::Ollama => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.effective_endpoint(), "https://api.openai.com");
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_openai_key_from_env() {
        let config = LlmConfig::default().with_overrides(lookup(&[("OPENAI_API_KEY", "sk-test")]));
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert!(config.has_credentials());
    }

    #[test]
    fn test_llm_api_key_wins() {
        let config = LlmConfig::default().with_overrides(lookup(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("LLM_API_KEY", "sk-explicit"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("sk-explicit"));
    }

    #[test]
    fn test_blank_key_ignored() {
        let config = LlmConfig::default().with_overrides(lookup(&[("OPENAI_API_KEY", "  ")]));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_groq_provider_defaults() {
        let config = LlmConfig::default().with_overrides(lookup(&[
            ("LLM_PROVIDER", "groq"),
            ("GROQ_API_KEY", "gsk-test"),
            ("LLM_MODEL", "llama-3.1-70b-versatile"),
        ]));
        assert_eq!(config.provider, LlmProvider::OpenAI);
        assert_eq!(config.effective_endpoint(), "https://api.groq.com/openai");
        assert_eq!(config.api_key.as_deref(), Some("gsk-test"));
        assert_eq!(config.model, "llama-3.1-70b-versatile");
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = LlmConfig::default().with_overrides(lookup(&[
            ("LLM_PROVIDER", "ollama"),
            ("LLM_ENDPOINT", "http://gpu-box:11434/"),
        ]));
        assert_eq!(config.provider, LlmProvider::Ollama);
        assert_eq!(config.effective_endpoint(), "http://gpu-box:11434");
        assert!(config.has_credentials());
    }

    #[test]
    fn test_timeout_override() {
        let config = LlmConfig::default().with_overrides(lookup(&[("LLM_TIMEOUT_SECS", "30")]));
        assert_eq!(config.timeout_secs, 30);

        let config = LlmConfig::default().with_overrides(lookup(&[("LLM_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_temperature_not_overridable() {
        let config = LlmConfig::default().with_overrides(lookup(&[("LLM_TEMPERATURE", "1.5")]));
        assert_eq!(config, LlmConfig::default());
    }
}
