//! Word document assembly.
//!
//! The output is deliberately flat: one level-0 heading and one bulleted
//! paragraph holding questions and answers together. Newlines in the text
//! become line breaks inside that single paragraph.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, BreakType, DocumentChild, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, Paragraph, ParagraphChild, Run, RunChild, Start, Style,
    StyleType,
};
use thiserror::Error;

/// Heading placed at the top of every generated document.
pub const DOCUMENT_HEADING: &str = "Questions and Answers";

/// Filename offered for download.
pub const DOCUMENT_FILENAME: &str = "questions_and_answers.docx";

/// Content type of the generated document.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const HEADING_STYLE: &str = "Title";
const BODY_STYLE: &str = "ListBullet";
const BULLET_NUMBERING_ID: usize = 1;

/// Errors from building or reading documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to write document: {0}")]
    Pack(String),

    #[error("Failed to read document: {0}")]
    Read(String),

    #[error("Unexpected document layout: {0}")]
    Layout(String),
}

/// Render questions and answers as one block of text.
pub fn combine_questions_answers(questions: &str, answers: &str) -> String {
    format!(
        "**Questions:**\n{}\n\n**Answers:**\n{}",
        questions, answers
    )
}

/// The assembled questions-and-answers document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaDocument {
    pub heading: String,
    pub body: String,
}

impl QaDocument {
    /// Lay out questions and answers under the standard heading.
    ///
    /// CRLF and lone CR line endings (as posted by browser forms) are
    /// normalized to `\n`.
    pub fn new(questions: &str, answers: &str) -> Self {
        Self {
            heading: DOCUMENT_HEADING.to_string(),
            body: combine_questions_answers(
                &normalize_newlines(questions),
                &normalize_newlines(answers),
            ),
        }
    }

    fn to_docx(&self) -> Docx {
        let bullet = AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        ));

        Docx::new()
            .add_style(
                Style::new(HEADING_STYLE, StyleType::Paragraph)
                    .name("Title")
                    .size(56),
            )
            .add_style(Style::new(BODY_STYLE, StyleType::Paragraph).name("List Bullet"))
            .add_abstract_numbering(bullet)
            .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID))
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(&self.heading))
                    .style(HEADING_STYLE),
            )
            .add_paragraph(
                Paragraph::new()
                    .add_run(text_run(&self.body))
                    .style(BODY_STYLE)
                    .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
            )
    }

    /// Serialize to .docx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let mut cursor = Cursor::new(Vec::new());
        self.to_docx()
            .build()
            .pack(&mut cursor)
            .map_err(|e| DocumentError::Pack(e.to_string()))?;

        let bytes = cursor.into_inner();
        tracing::debug!("Packed document ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Reopen a document produced by `to_bytes`.
    ///
    /// Expects exactly one heading paragraph followed by one body paragraph.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let docx = docx_rs::read_docx(bytes).map_err(|e| DocumentError::Read(e.to_string()))?;

        let paragraphs: Vec<(Option<String>, String)> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => Some((
                    p.property.style.as_ref().map(|s| s.val.clone()),
                    paragraph_text(p),
                )),
                _ => None,
            })
            .collect();

        match paragraphs.as_slice() {
            [(heading_style, heading), (_, body)] => {
                if heading_style.as_deref() != Some(HEADING_STYLE) {
                    return Err(DocumentError::Layout(format!(
                        "first paragraph has style {:?}, expected {}",
                        heading_style, HEADING_STYLE
                    )));
                }
                Ok(Self {
                    heading: heading.clone(),
                    body: body.clone(),
                })
            }
            other => Err(DocumentError::Layout(format!(
                "expected 2 paragraphs, found {}",
                other.len()
            ))),
        }
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Build a run whose lines are separated by text-wrapping breaks.
fn text_run(text: &str) -> Run {
    let mut run = Run::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        if !line.is_empty() {
            run = run.add_text(line);
        }
    }
    run
}

/// Flatten a paragraph back to text, turning breaks into newlines.
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}
