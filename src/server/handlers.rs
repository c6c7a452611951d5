//! HTTP handlers for the web interface.

use askama::Template;
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, warn};

use super::assets;
use super::template_structs::{ErrorTemplate, IndexTemplate, ResultsTemplate};
use super::AppState;
use crate::document::{QaDocument, DOCUMENT_FILENAME, DOCX_CONTENT_TYPE};
use crate::intake::{ImageUpload, ACCEPTED_EXTENSIONS};

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// Shown for any failure inside the pipeline; details go to the log.
const GENERIC_FAILURE: &str =
    "Something went wrong while generating questions. Please try again.";

/// Render a template, falling back to a plain 500 if rendering fails.
fn render<T: Template>(template: &T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Template render failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn error_page(status: StatusCode, message: &str) -> Response {
    render(
        &ErrorTemplate {
            title: "Error",
            message,
        },
        status,
    )
}

fn accept_attribute() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{}", ext))
        .collect::<Vec<_>>()
        .join(",")
}

/// Upload form.
pub async fn index() -> Response {
    let accept = accept_attribute();
    render(
        &IndexTemplate {
            title: "Upload",
            accept: &accept,
        },
        StatusCode::OK,
    )
}

/// Read the image field out of a multipart upload.
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<(String, Vec<u8>)>, String> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(e.to_string()),
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        return Ok(Some((filename, bytes.to_vec())));
    }
}

/// Run the pipeline on an uploaded image and show the results.
pub async fn process_upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let (filename, bytes) = match read_image_field(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_page(StatusCode::BAD_REQUEST, "No image was uploaded."),
        Err(e) => {
            warn!("Failed to read upload: {}", e);
            return error_page(StatusCode::BAD_REQUEST, "Failed to read the uploaded file.");
        }
    };

    let image = match ImageUpload::from_bytes(filename, bytes) {
        Ok(image) => image,
        Err(e) => {
            warn!("Rejected upload: {}", e);
            let message = format!("{}. Please upload one of: {}.", e, accept_attribute());
            return error_page(StatusCode::BAD_REQUEST, &message);
        }
    };

    let output = match state.pipeline.run(&image).await {
        Ok(output) => output,
        Err(e) => {
            error!("Pipeline failed for {}: {}", image.filename, e);
            return error_page(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE);
        }
    };

    let combined = output.combined();
    render(
        &ResultsTemplate {
            title: "Results",
            extracted_text: &output.extracted_text,
            topics: &output.topics,
            combined: &combined,
            questions: &output.questions,
            answers: &output.answers,
        },
        StatusCode::OK,
    )
}

/// Form posted by the download button.
#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    #[serde(default)]
    pub questions: String,
    #[serde(default)]
    pub answers: String,
}

/// Assemble the document from posted questions and answers and send it.
pub async fn download_document(Form(form): Form<DownloadForm>) -> Response {
    let document = QaDocument::new(&form.questions, &form.answers);

    match document.to_bytes() {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DOCUMENT_FILENAME),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("Document serialization failed: {}", e);
            error_page(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE)
        }
    }
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Serve CSS.
pub async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], assets::CSS)
}
