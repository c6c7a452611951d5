//! quizscribe - turn a photographed page into study questions and answers.
//!
//! An uploaded image goes through OCR, the recognised text is sent to a
//! language model for topics, questions, and answers, and the result is laid
//! out in a Word document for download.

pub mod cli;
pub mod config;
pub mod document;
pub mod generators;
pub mod intake;
pub mod llm;
pub mod ocr;
pub mod pipeline;
pub mod server;
