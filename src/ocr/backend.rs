//! OCR backend abstraction.
//!
//! The pipeline only talks to `dyn OcrBackend`, so the recognition engine can
//! be swapped (or stubbed in tests) without touching the driver.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intake::ImageFormat;

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Extracted text content, unvalidated.
    pub text: String,
    /// Which backend produced this result.
    pub backend: OcrBackendType,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Available OCR backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackendType {
    /// Tesseract OCR via command-line.
    #[default]
    Tesseract,
}

impl OcrBackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OcrBackendType::Tesseract => "tesseract",
        }
    }
}

impl std::fmt::Display for OcrBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for OCR backends.
pub trait OcrBackend: Send + Sync {
    /// Get the backend type.
    fn backend_type(&self) -> OcrBackendType;

    /// Check if this backend is available (dependencies installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Run OCR on an image file.
    fn ocr_image(&self, image_path: &Path) -> Result<OcrResult, OcrError>;

    /// Run OCR on in-memory image bytes.
    ///
    /// Stages the bytes in a temporary file carrying the right extension,
    /// since engines pick their decoder from it.
    fn ocr_bytes(&self, bytes: &[u8], format: ImageFormat) -> Result<OcrResult, OcrError> {
        let mut staged = tempfile::Builder::new()
            .prefix("quizscribe-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        staged.write_all(bytes)?;
        staged.flush()?;

        self.ocr_image(staged.path())
    }
}

/// Configuration for OCR backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Which engine to run.
    #[serde(default)]
    pub backend: OcrBackendType,
    /// Language for OCR (e.g., "eng", "chi_sim").
    #[serde(default = "default_language")]
    pub language: String,
    /// Command used to launch Tesseract. A bare name is resolved on PATH.
    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: String,
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_tesseract_cmd() -> String {
    "tesseract".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackendType::default(),
            language: default_language(),
            tesseract_cmd: default_tesseract_cmd(),
        }
    }
}

impl OcrConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `TESSERACT_CMD`: path or name of the tesseract binary
    /// - `OCR_LANGUAGE`: tesseract language code(s), e.g. `eng+deu`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("TESSERACT_CMD") {
            if !val.trim().is_empty() {
                self.tesseract_cmd = val;
            }
        }
        if let Some(val) = lookup("OCR_LANGUAGE") {
            if !val.trim().is_empty() {
                self.language = val;
            }
        }
        self
    }
}
