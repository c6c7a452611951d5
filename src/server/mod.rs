//! Web server for uploading a page and downloading the generated questions.
//!
//! Stateless: results are rendered straight into the response, and the
//! download form posts the questions and answers back to be assembled.

mod assets;
mod handlers;
mod routes;
mod template_structs;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::LlmClient;
use crate::ocr;
use crate::pipeline::Pipeline;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let llm = LlmClient::new(settings.llm.clone())?;
        let ocr = ocr::create_backend(&settings.ocr);

        if !ocr.is_available() {
            tracing::warn!("{}", ocr.availability_hint());
        }
        if !settings.llm.has_credentials() {
            tracing::warn!("No LLM API key configured; generation requests will fail");
        }

        Ok(Self {
            pipeline: Pipeline::new(ocr, Arc::new(llm)),
            max_upload_bytes: settings.server.max_upload_bytes,
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
