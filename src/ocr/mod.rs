//! OCR module.
//!
//! Extracts text from uploaded images. Tesseract is the only engine shipped;
//! it is invoked as a local command and its output is returned unvalidated.

mod backend;
mod tesseract;

use std::sync::Arc;

pub use backend::{OcrBackend, OcrBackendType, OcrConfig, OcrError, OcrResult};
pub use tesseract::TesseractBackend;

/// Build the backend selected by the configuration.
pub fn create_backend(config: &OcrConfig) -> Arc<dyn OcrBackend> {
    match config.backend {
        OcrBackendType::Tesseract => Arc::new(TesseractBackend::with_config(config.clone())),
    }
}
