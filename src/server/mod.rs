//! Web server exposing the analysis pipeline.
//!
//! Endpoints:
//! - `POST /api/analyze` — multipart upload, returns OCR text and AI advice
//! - `POST /api/chat` (alias `/api/analyze/chat`) — follow-up Q&A
//! - `GET /api/health` — connectivity check

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::llm::ChatCompletionsClient;
use crate::ocr::OcrSpaceClient;
use crate::services::AnalysisService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let ocr = OcrSpaceClient::new(settings.ocr.clone())?;
        let completion = ChatCompletionsClient::new(settings.completion.clone())?;
        Ok(Self {
            service: Arc::new(AnalysisService::new(Arc::new(ocr), Arc::new(completion))),
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
