//! Prompt templates for question generation.
//!
//! Each template carries a single `{content}` placeholder that receives the
//! input text verbatim.

/// System role sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an expert question generator for academic purposes.";

/// Sampling temperature for every request. Not configurable.
pub const TEMPERATURE: f32 = 0.7;

/// Prompt for identifying topics and concepts in extracted text.
pub const TOPICS_PROMPT: &str =
    "Identify the main topics and concepts from the following text:\n\n{content}";

/// Prompt for generating academic questions from extracted text.
pub const QUESTIONS_PROMPT: &str = "Generate a set of academic questions (MCQs, True/False, Fill-in-the-blanks, Descriptive) based on the following text:\n\n{content}";

/// Prompt for answering previously generated questions.
pub const ANSWERS_PROMPT: &str =
    "Provide detailed answers and explanations for the following questions:\n\n{content}";

/// Output budgets, in tokens.
pub const TOPICS_MAX_TOKENS: u32 = 500;
pub const QUESTIONS_MAX_TOKENS: u32 = 1000;
pub const ANSWERS_MAX_TOKENS: u32 = 1500;

/// Substitute `content` into a template.
pub fn build_prompt(template: &str, content: &str) -> String {
    template.replace("{content}", content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_have_placeholder() {
        for template in [TOPICS_PROMPT, QUESTIONS_PROMPT, ANSWERS_PROMPT] {
            assert_eq!(template.matches("{content}").count(), 1);
        }
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt(TOPICS_PROMPT, "Photosynthesis converts light.");
        assert_eq!(
            prompt,
            "Identify the main topics and concepts from the following text:\n\nPhotosynthesis converts light."
        );
    }

    #[test]
    fn test_build_prompt_keeps_braces_in_content() {
        // Content is inserted once; braces inside it are left alone
        let prompt = build_prompt(ANSWERS_PROMPT, "Q1. What is {x}?");
        assert!(prompt.ends_with("Q1. What is {x}?"));
    }
}
