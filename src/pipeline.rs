//! The question-generation pipeline.
//!
//! Intake → OCR → topics + questions (same text) → answers → document.
//! Every step is awaited before the next starts, and the first failure ends
//! the run: there is no retry and no partial result.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::info;

use crate::document::{combine_questions_answers, DocumentError, QaDocument};
use crate::generators::{generate_answers, generate_questions, identify_topics};
use crate::intake::{ImageUpload, IntakeError};
use crate::llm::{CompletionClient, LlmError};
use crate::ocr::{OcrBackend, OcrError};

/// Errors that end a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("OCR task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub extracted_text: String,
    pub topics: String,
    pub questions: String,
    pub answers: String,
}

impl PipelineOutput {
    /// Questions and answers rendered as one block, as shown to the user.
    pub fn combined(&self) -> String {
        combine_questions_answers(&self.questions, &self.answers)
    }

    /// Assemble the downloadable document.
    pub fn to_document(&self) -> QaDocument {
        QaDocument::new(&self.questions, &self.answers)
    }
}

/// Sequences OCR and the generators over explicit, shared handles.
#[derive(Clone)]
pub struct Pipeline {
    ocr: Arc<dyn OcrBackend>,
    llm: Arc<dyn CompletionClient>,
}

impl Pipeline {
    pub fn new(ocr: Arc<dyn OcrBackend>, llm: Arc<dyn CompletionClient>) -> Self {
        Self { ocr, llm }
    }

    pub fn ocr(&self) -> &Arc<dyn OcrBackend> {
        &self.ocr
    }

    /// Run OCR on an accepted upload.
    pub async fn extract_text(&self, image: &ImageUpload) -> Result<String, PipelineError> {
        let ocr = self.ocr.clone();
        let bytes = image.bytes.clone();
        let format = image.format;

        // Tesseract is a blocking subprocess
        let result = tokio::task::spawn_blocking(move || ocr.ocr_bytes(&bytes, format)).await??;

        info!(
            "OCR ({}) extracted {} chars from {} in {}ms",
            result.backend,
            result.text.len(),
            image.filename,
            result.processing_time_ms
        );
        Ok(result.text)
    }

    /// Run the full pipeline on an accepted upload.
    pub async fn run(&self, image: &ImageUpload) -> Result<PipelineOutput, PipelineError> {
        let start = Instant::now();

        let extracted_text = self.extract_text(image).await?;
        let output = self.generate(extracted_text).await?;

        info!(
            "Pipeline finished for {} in {:?}",
            image.filename,
            start.elapsed()
        );
        Ok(output)
    }

    /// Run the language-model steps on already-extracted text.
    pub async fn generate(&self, extracted_text: String) -> Result<PipelineOutput, PipelineError> {
        let llm = self.llm.as_ref();

        let topics = identify_topics(llm, &extracted_text).await?;
        let questions = generate_questions(llm, &extracted_text).await?;
        let answers = generate_answers(llm, &questions).await?;

        Ok(PipelineOutput {
            extracted_text,
            topics,
            questions,
            answers,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::intake::ImageFormat;
    use crate::ocr::{OcrBackendType, OcrResult};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    /// OCR stub returning fixed text.
    pub(crate) struct FixedOcr(pub String);

    impl OcrBackend for FixedOcr {
        fn backend_type(&self) -> OcrBackendType {
            OcrBackendType::Tesseract
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            "stub".to_string()
        }

        fn ocr_image(&self, _image_path: &Path) -> Result<OcrResult, OcrError> {
            Ok(OcrResult {
                text: self.0.clone(),
                backend: OcrBackendType::Tesseract,
                processing_time_ms: 1,
            })
        }
    }

    /// OCR stub that always fails.
    pub(crate) struct BrokenOcr;

    impl OcrBackend for BrokenOcr {
        fn backend_type(&self) -> OcrBackendType {
            OcrBackendType::Tesseract
        }

        fn is_available(&self) -> bool {
            false
        }

        fn availability_hint(&self) -> String {
            "not installed".to_string()
        }

        fn ocr_image(&self, _image_path: &Path) -> Result<OcrResult, OcrError> {
            Err(OcrError::BackendNotAvailable("tesseract not found".to_string()))
        }
    }

    /// Model stub that answers by prompt kind and records the prompts.
    pub(crate) struct ScriptedModel {
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub(crate) fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedModel {
        async fn complete(&self, prompt: &str, _max_tokens: u32) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let reply = if prompt.starts_with("Identify") {
                "Topics: cells"
            } else if prompt.starts_with("Generate") {
                "Q1. What is a cell?"
            } else {
                "A1. The basic unit of life."
            };
            Ok(reply.to_string())
        }
    }

    fn upload() -> ImageUpload {
        ImageUpload {
            filename: "page.png".to_string(),
            format: ImageFormat::Png,
            bytes: b"image".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_full_run() {
        let model = Arc::new(ScriptedModel::new());
        let pipeline = Pipeline::new(
            Arc::new(FixedOcr("Cells are the basic unit of life.".to_string())),
            model.clone(),
        );

        let output = pipeline.run(&upload()).await.unwrap();
        assert_eq!(output.extracted_text, "Cells are the basic unit of life.");
        assert_eq!(output.topics, "Topics: cells");
        assert_eq!(output.questions, "Q1. What is a cell?");
        assert_eq!(output.answers, "A1. The basic unit of life.");

        let prompts = model.prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 3);
        // Topics and questions see the OCR text; answers see the questions
        assert!(prompts[0].contains("Cells are the basic unit of life."));
        assert!(prompts[1].contains("Cells are the basic unit of life."));
        assert!(prompts[2].contains("Q1. What is a cell?"));
        assert!(!prompts[2].contains("Cells are the basic unit of life."));
    }

    #[tokio::test]
    async fn test_empty_ocr_text_does_not_fail() {
        let model = Arc::new(ScriptedModel::new());
        let pipeline = Pipeline::new(Arc::new(FixedOcr(String::new())), model.clone());

        let output = pipeline.run(&upload()).await.unwrap();
        assert!(output.extracted_text.is_empty());
        assert_eq!(model.prompts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ocr_failure_stops_before_model() {
        let model = Arc::new(ScriptedModel::new());
        let pipeline = Pipeline::new(Arc::new(BrokenOcr), model.clone());

        let err = pipeline.run(&upload()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::BackendNotAvailable(_))));
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_output_document() {
        let output = PipelineOutput {
            extracted_text: String::new(),
            topics: String::new(),
            questions: "Q1...".to_string(),
            answers: "A1...".to_string(),
        };
        assert_eq!(output.combined(), output.to_document().body);
    }
}
