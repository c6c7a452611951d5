//! LLM client for question generation.
//!
//! Supports OpenAI-compatible chat completions (default) and the Ollama API.

mod config;
pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use config::{LlmConfig, LlmProvider};
use prompts::{SYSTEM_PROMPT, TEMPERATURE};

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
    /// No API key configured for a provider that needs one
    #[error("No API key configured (set OPENAI_API_KEY or LLM_API_KEY)")]
    MissingApiKey,
    /// Response carried no completion
    #[error("Response contained no choices")]
    EmptyChoices,
}

/// A text-completion service.
///
/// The pipeline depends on this trait rather than on `LlmClient` so the
/// model can be replaced by a stub.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` and return the trimmed response, capped at `max_tokens`.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}

/// LLM client handle. Holds no state between calls.
pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

/// OpenAI chat completions request format.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// OpenAI chat completions response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Get the config.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Call an OpenAI-compatible chat completions endpoint.
    async fn call_openai(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.config.effective_endpoint());
        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let chat: ChatResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyChoices)?;

        Ok(choice.message.content.unwrap_or_default())
    }

    /// Call Ollama API with a prompt.
    async fn call_ollama(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        let request = OllamaRequest {
            model: &self.config.model,
            prompt,
            system: SYSTEM_PROMPT,
            stream: false,
            options: OllamaOptions {
                temperature: TEMPERATURE,
                num_predict: max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.effective_endpoint());
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        debug!(
            "Requesting completion from {} ({}, {} prompt chars, max {} tokens)",
            self.config.provider.as_str(),
            self.config.model,
            prompt.len(),
            max_tokens
        );

        let response = match self.config.provider {
            LlmProvider::OpenAI => self.call_openai(prompt, max_tokens).await?,
            LlmProvider::Ollama => self.call_ollama(prompt, max_tokens).await?,
        };

        Ok(response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn openai_config(endpoint: &str) -> LlmConfig {
        LlmConfig::default()
            .with_endpoint(endpoint)
            .with_api_key("sk-test")
    }

    #[tokio::test]
    async fn test_openai_request_shape_and_trimmed_response() {
        let captured: Arc<Mutex<Option<(Value, String)>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();

        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    *sink.lock().unwrap() = Some((body, auth));
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": "\n  Q1. What is ATP?  \n"}}]
                    }))
                }
            }),
        );
        let base = spawn_stub(router).await;

        let client = LlmClient::new(openai_config(&base)).unwrap();
        let answer = client.complete("Explain ATP", 1000).await.unwrap();
        assert_eq!(answer, "Q1. What is ATP?");

        let (body, auth) = captured.lock().unwrap().take().unwrap();
        assert_eq!(auth, "Bearer sk-test");
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["max_tokens"], 1000);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Explain ATP");
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "{\"error\":{\"message\":\"quota exceeded\"}}",
                )
            }),
        );
        let base = spawn_stub(router).await;

        let client = LlmClient::new(openai_config(&base)).unwrap();
        let err = client.complete("prompt", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::Api(msg) if msg.contains("429") && msg.contains("quota")));
    }

    #[tokio::test]
    async fn test_empty_choices() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base = spawn_stub(router).await;

        let client = LlmClient::new(openai_config(&base)).unwrap();
        let err = client.complete("prompt", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyChoices));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = LlmClient::new(LlmConfig::default().with_endpoint("http://127.0.0.1:9")).unwrap();
        let err = client.complete("prompt", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn test_connection_error() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LlmClient::new(openai_config(&format!("http://{}", addr))).unwrap();
        let err = client.complete("prompt", 10).await.unwrap_err();
        assert!(matches!(err, LlmError::Connection(_)));
    }

    #[tokio::test]
    async fn test_ollama_request_shape() {
        let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();

        let router = Router::new().route(
            "/api/generate",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    *sink.lock().unwrap() = Some(body);
                    Json(json!({ "response": " photosynthesis, chlorophyll ", "done": true }))
                }
            }),
        );
        let base = spawn_stub(router).await;

        let config = LlmConfig {
            provider: LlmProvider::Ollama,
            ..LlmConfig::default()
        }
        .with_endpoint(&base)
        .with_model("llama3.2");
        let client = LlmClient::new(config).unwrap();

        let topics = client.complete("Identify topics", 500).await.unwrap();
        assert_eq!(topics, "photosynthesis, chlorophyll");

        let body = captured.lock().unwrap().take().unwrap();
        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["prompt"], "Identify topics");
        assert_eq!(body["system"], SYSTEM_PROMPT);
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 500);
    }
}
