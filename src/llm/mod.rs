//! LLM integration for topic, question, and answer generation.

mod client;

pub use client::prompts;
pub use client::{CompletionClient, LlmClient, LlmConfig, LlmError, LlmProvider};
