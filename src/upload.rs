//! Upload validation for incoming documents.
//!
//! Documents are held in memory only; nothing is written to disk.

use crate::error::AnalysisError;

/// Maximum accepted upload size (15 MiB).
pub const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

/// Image MIME subtypes accepted for OCR.
const ALLOWED_IMAGE_SUBTYPES: &[&str] = &["jpeg", "png", "webp", "bmp", "tiff", "gif"];

/// A document uploaded for analysis. Owned by the request that created it
/// and discarded once the analyze call completes.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    /// Raw file bytes.
    pub bytes: Vec<u8>,
    /// MIME type declared by the client.
    pub mime_type: String,
    /// Original filename, used as the file part name for the OCR provider.
    pub filename: String,
}

impl UploadedDocument {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }

    /// Whether the declared MIME type is `application/pdf`.
    pub fn is_pdf(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case("application/pdf")
    }
}

/// Check whether a declared MIME type is accepted (case-insensitive).
pub fn is_allowed_mime_type(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    if mime == "application/pdf" {
        return true;
    }
    mime.strip_prefix("image/")
        .is_some_and(|subtype| ALLOWED_IMAGE_SUBTYPES.contains(&subtype))
}

/// Validate a document before any external call is made.
///
/// Accepts only files at or under [`MAX_UPLOAD_BYTES`] whose declared MIME
/// type is one of the allowed image subtypes or `application/pdf`.
pub fn validate(document: &UploadedDocument) -> Result<(), AnalysisError> {
    if document.bytes.is_empty() {
        return Err(AnalysisError::InvalidInput("File required".to_string()));
    }
    if document.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AnalysisError::InvalidInput(
            "File too large (max 15MB)".to_string(),
        ));
    }
    if !is_allowed_mime_type(&document.mime_type) {
        return Err(AnalysisError::InvalidInput(
            "Only image or PDF files are allowed".to_string(),
        ));
    }
    Ok(())
}
