//! Topic, question, and answer generators.
//!
//! Each generator fills one fixed template and sends it with a fixed output
//! budget. Responses are opaque text; nothing checks that "questions" really
//! are MCQs, True/False, and so on.

use tracing::info;

use crate::llm::prompts::{
    build_prompt, ANSWERS_MAX_TOKENS, ANSWERS_PROMPT, QUESTIONS_MAX_TOKENS, QUESTIONS_PROMPT,
    TOPICS_MAX_TOKENS, TOPICS_PROMPT,
};
use crate::llm::{CompletionClient, LlmError};

/// Identify the main topics and concepts in extracted text.
pub async fn identify_topics(client: &dyn CompletionClient, text: &str) -> Result<String, LlmError> {
    info!("Identifying topics ({} chars of text)", text.len());
    let prompt = build_prompt(TOPICS_PROMPT, text);
    client.complete(&prompt, TOPICS_MAX_TOKENS).await
}

/// Generate academic questions from extracted text.
pub async fn generate_questions(
    client: &dyn CompletionClient,
    text: &str,
) -> Result<String, LlmError> {
    info!("Generating questions ({} chars of text)", text.len());
    let prompt = build_prompt(QUESTIONS_PROMPT, text);
    client.complete(&prompt, QUESTIONS_MAX_TOKENS).await
}

/// Generate detailed answers for previously generated questions.
pub async fn generate_answers(
    client: &dyn CompletionClient,
    questions: &str,
) -> Result<String, LlmError> {
    info!("Generating answers ({} chars of questions)", questions.len());
    let prompt = build_prompt(ANSWERS_PROMPT, questions);
    client.complete(&prompt, ANSWERS_MAX_TOKENS).await
}
