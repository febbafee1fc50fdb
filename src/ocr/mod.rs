//! OCR text extraction via the OCR.space HTTP API.
//!
//! The provider response is classified three ways:
//! - full success: parsed text with no processing error
//! - partial success: a page-limit error but usable text was still parsed,
//!   returned with the provider's message as a warning
//! - hard failure: any other processing error, or a page-limit error with
//!   no recovered text, or an empty parse with no error signalled

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::OcrSettings;
use crate::error::AnalysisError;
use crate::upload::UploadedDocument;

/// Outcome of an OCR extraction. Produced once per analyze call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutcome {
    /// Extracted text, page fragments joined by blank lines and trimmed.
    pub text: String,
    /// Provider message when the result is a partial success.
    pub warning: Option<String>,
}

/// Backend that extracts text from an uploaded document.
#[async_trait]
pub trait OcrBackend: Send + Sync {
    async fn extract_text(&self, document: &UploadedDocument) -> Result<OcrOutcome, AnalysisError>;
}

/// OCR.space error messages arrive either as a string or an array of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    fn joined(&self) -> String {
        match self {
            ErrorMessage::One(s) => s.clone(),
            ErrorMessage::Many(v) => v.join("; "),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OcrSpaceResponse {
    #[serde(rename = "ParsedResults")]
    parsed_results: Option<Vec<ParsedResult>>,
    #[serde(rename = "IsErroredOnProcessing")]
    is_errored_on_processing: bool,
    #[serde(rename = "ErrorMessage")]
    error_message: Option<ErrorMessage>,
    #[serde(rename = "ErrorDetails")]
    error_details: Option<String>,
}

impl OcrSpaceResponse {
    /// Concatenate per-page text fragments in provider order.
    fn joined_text(&self) -> String {
        let fragments: Vec<&str> = self
            .parsed_results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|r| r.parsed_text.as_str())
            .collect();
        fragments.join("\n\n").trim().to_string()
    }

    fn error_text(&self) -> String {
        self.error_message
            .as_ref()
            .map(|m| m.joined())
            .or_else(|| self.error_details.clone())
            .unwrap_or_else(|| "OCR provider error".to_string())
    }
}

/// Whether a provider error message indicates the page-limit condition.
fn is_page_limit_error(message: &str) -> bool {
    message.to_lowercase().contains("page limit")
}

/// Classify a provider response into success, partial success, or failure.
fn classify_response(response: &OcrSpaceResponse) -> Result<OcrOutcome, AnalysisError> {
    let text = response.joined_text();

    if response.is_errored_on_processing {
        let message = response.error_text();
        if is_page_limit_error(&message) && !text.is_empty() {
            // Partial success: the caller still gets usable output.
            return Ok(OcrOutcome {
                text,
                warning: Some(message),
            });
        }
        return Err(AnalysisError::Provider(message));
    }

    if text.is_empty() {
        return Err(AnalysisError::EmptyResult);
    }

    Ok(OcrOutcome {
        text,
        warning: None,
    })
}

/// Client for the OCR.space parse endpoint.
pub struct OcrSpaceClient {
    settings: OcrSettings,
    client: Client,
}

impl OcrSpaceClient {
    pub fn new(settings: OcrSettings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { settings, client })
    }

    fn build_form(&self, document: &UploadedDocument) -> Result<Form, AnalysisError> {
        let file_part = Part::bytes(document.bytes.clone())
            .file_name(document.filename.clone())
            .mime_str(&document.mime_type)
            .map_err(|e| AnalysisError::InvalidInput(format!("Invalid MIME type: {}", e)))?;

        let searchable_pdf = if document.is_pdf() { "true" } else { "false" };

        Ok(Form::new()
            .text("apikey", self.settings.api_key.clone())
            .part("file", file_part)
            .text("language", "eng")
            .text("isOverlayRequired", "false")
            .text("isCreateSearchablePdf", searchable_pdf)
            .text("scale", "true")
            .text("OCREngine", "2"))
    }

    /// Submit the document, retrying transient transport failures.
    async fn submit(&self, document: &UploadedDocument) -> Result<OcrSpaceResponse, AnalysisError> {
        let mut attempt = 0;
        loop {
            let form = self.build_form(document)?;
            let result = self
                .client
                .post(&self.settings.endpoint)
                .multipart(form)
                .send()
                .await;

            let retryable = match &result {
                Err(e) => e.is_timeout() || e.is_connect(),
                Ok(resp) => resp.status().is_server_error() || resp.status().as_u16() == 429,
            };

            if retryable && attempt < self.settings.max_retries {
                let wait = Duration::from_millis(500 * 2u64.pow(attempt));
                warn!(attempt, "OCR request failed transiently, retrying in {:?}", wait);
                tokio::time::sleep(wait).await;
                attempt += 1;
                continue;
            }

            let resp = result.map_err(|e| AnalysisError::Provider(e.to_string()))?;
            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(AnalysisError::Provider(format!("HTTP {}: {}", status, body)));
            }

            return resp
                .json()
                .await
                .map_err(|e| AnalysisError::Provider(format!("Failed to parse response: {}", e)));
        }
    }
}

#[async_trait]
impl OcrBackend for OcrSpaceClient {
    async fn extract_text(&self, document: &UploadedDocument) -> Result<OcrOutcome, AnalysisError> {
        debug!(
            mime_type = %document.mime_type,
            size = document.bytes.len(),
            "submitting document for OCR"
        );
        let response = self.submit(document).await?;
        classify_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(
        texts: &[&str],
        errored: bool,
        message: Option<ErrorMessage>,
    ) -> OcrSpaceResponse {
        OcrSpaceResponse {
            parsed_results: Some(
                texts
                    .iter()
                    .map(|t| ParsedResult {
                        parsed_text: t.to_string(),
                    })
                    .collect(),
            ),
            is_errored_on_processing: errored,
            error_message: message,
            error_details: None,
        }
    }

    #[test]
    fn test_pages_joined_by_blank_line() {
        let resp = response_with(&["A", "B"], false, None);
        let outcome = classify_response(&resp).unwrap();
        assert_eq!(outcome.text, "A\n\nB");
        assert!(outcome.warning.is_none());
    }

    #[test]
    fn test_joined_text_is_trimmed() {
        let resp = response_with(&["  hello \n", ""], false, None);
        let outcome = classify_response(&resp).unwrap();
        assert_eq!(outcome.text, "hello");
    }

    #[test]
    fn test_page_limit_with_text_is_partial_success() {
        let resp = response_with(
            &["partial"],
            true,
            Some(ErrorMessage::One("Maximum page limit reached".to_string())),
        );
        let outcome = classify_response(&resp).unwrap();
        assert_eq!(outcome.text, "partial");
        assert_eq!(
            outcome.warning.as_deref(),
            Some("Maximum page limit reached")
        );
    }

    #[test]
    fn test_page_limit_without_text_is_hard_failure() {
        let resp = response_with(
            &[],
            true,
            Some(ErrorMessage::One("Maximum page limit reached".to_string())),
        );
        match classify_response(&resp) {
            Err(AnalysisError::Provider(msg)) => {
                assert_eq!(msg, "Maximum page limit reached");
            }
            other => panic!("expected Provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_page_limit_error_fails_even_with_text() {
        let resp = response_with(
            &["some text"],
            true,
            Some(ErrorMessage::One(
                "Unable to recognize the file type".to_string(),
            )),
        );
        assert!(matches!(
            classify_response(&resp),
            Err(AnalysisError::Provider(_))
        ));
    }

    #[test]
    fn test_array_error_messages_joined() {
        let resp = response_with(
            &[],
            true,
            Some(ErrorMessage::Many(vec![
                "E101".to_string(),
                "Timed out".to_string(),
            ])),
        );
        match classify_response(&resp) {
            Err(AnalysisError::Provider(msg)) => assert_eq!(msg, "E101; Timed out"),
            other => panic!("expected Provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_without_error_is_empty_result() {
        let resp = response_with(&["", "  "], false, None);
        assert!(matches!(
            classify_response(&resp),
            Err(AnalysisError::EmptyResult)
        ));

        let no_results = OcrSpaceResponse::default();
        assert!(matches!(
            classify_response(&no_results),
            Err(AnalysisError::EmptyResult)
        ));
    }

    #[test]
    fn test_error_falls_back_to_details_then_generic() {
        let resp = OcrSpaceResponse {
            parsed_results: None,
            is_errored_on_processing: true,
            error_message: None,
            error_details: Some("bad apikey".to_string()),
        };
        match classify_response(&resp) {
            Err(AnalysisError::Provider(msg)) => assert_eq!(msg, "bad apikey"),
            other => panic!("expected Provider error, got {:?}", other),
        }

        let bare = OcrSpaceResponse {
            is_errored_on_processing: true,
            ..Default::default()
        };
        match classify_response(&bare) {
            Err(AnalysisError::Provider(msg)) => assert_eq!(msg, "OCR provider error"),
            other => panic!("expected Provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_page_limit_match_is_case_insensitive() {
        assert!(is_page_limit_error("Maximum Page Limit reached"));
        assert!(is_page_limit_error("PAGE LIMIT exceeded"));
        assert!(!is_page_limit_error("file corrupted"));
    }

    #[test]
    fn test_provider_response_deserialization() {
        let body = r#"{
            "ParsedResults": [{"ParsedText": "Pay $500 by Friday"}],
            "IsErroredOnProcessing": false
        }"#;
        let resp: OcrSpaceResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            classify_response(&resp).unwrap().text,
            "Pay $500 by Friday"
        );

        let errored = r#"{
            "ParsedResults": [],
            "IsErroredOnProcessing": true,
            "ErrorMessage": ["Maximum page limit reached"]
        }"#;
        let resp: OcrSpaceResponse = serde_json::from_str(errored).unwrap();
        assert!(classify_response(&resp).is_err());
    }
}
