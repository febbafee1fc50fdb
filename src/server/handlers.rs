//! HTTP endpoint handlers.
//!
//! Errors are logged server-side with full detail; clients receive a short
//! message plus an optional details string, never the raw provider payload.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::AppState;
use crate::conversation::DEFAULT_SESSION;
use crate::error::AnalysisError;
use crate::upload::UploadedDocument;

/// Error body returned for every failure: `{error, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An API error with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                error: message.into(),
                details: None,
            },
        }
    }

    /// Map a pipeline error, using `short` as the client-facing message for
    /// server-side failures.
    fn from_analysis(err: AnalysisError, short: &str) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        error!(error = %err, "{}", short);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                error: short.to_string(),
                details: Some(err.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Session key from the optional `x-session-id` header.
fn session_key(headers: &HeaderMap) -> String {
    headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION)
        .to_string()
}

/// Health check endpoint for quick connectivity checks.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    #[serde(rename = "ocrText")]
    pub ocr_text: String,
    #[serde(rename = "aiAdvice")]
    pub ai_advice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Upload a notice and get OCR text plus AI advice.
pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut document = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Upload failed: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Upload failed: {}", e)))?;
        document = Some(UploadedDocument::new(bytes.to_vec(), mime_type, filename));
    }

    let document = document.ok_or_else(|| ApiError::bad_request("File required"))?;
    let session = session_key(&headers);

    let result = state
        .service
        .analyze(&session, document)
        .await
        .map_err(|e| ApiError::from_analysis(e, "Processing failed"))?;

    Ok(Json(AnalyzeResponse {
        ocr_text: result.notice_text,
        ai_advice: result.advice,
        warning: result.warning,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(rename = "userMessage")]
    pub user_message: Option<String>,
    /// Legacy alias for `userMessage`.
    pub message: Option<String>,
    #[serde(rename = "ocrText")]
    pub ocr_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(rename = "aiReply")]
    pub ai_reply: String,
}

/// Ask a follow-up question about a previously analyzed notice.
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let user_text = request
        .user_message
        .or(request.message)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("userMessage required"))?;

    let session = session_key(&headers);
    let reply = state
        .service
        .chat(&session, &user_text, request.ocr_text.as_deref())
        .await
        .map_err(|e| ApiError::from_analysis(e, "Chat failed"))?;

    Ok(Json(ChatResponse { ai_reply: reply }))
}
