//! Error taxonomy for the analysis pipeline.
//!
//! Every failure surfaced to the HTTP layer is one of these variants.
//! Provider transport failures fold into `Provider` once the retry
//! budget is exhausted; the provider's own message is carried verbatim.

use thiserror::Error;

/// Errors produced by the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Bad or missing input from the caller (file, MIME type, chat message).
    #[error("{0}")]
    InvalidInput(String),

    /// The OCR or completion provider reported a failure. The message is
    /// carried verbatim into the error details shown to the caller.
    #[error("{0}")]
    Provider(String),

    /// OCR produced no text and reported no explicit error.
    #[error("No text extracted from OCR response")]
    EmptyResult,

    /// The completion provider returned a response missing the expected shape.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    /// Whether this error maps to a client fault (HTTP 400).
    pub fn is_client_error(&self) -> bool {
        matches!(self, AnalysisError::InvalidInput(_))
    }
}
