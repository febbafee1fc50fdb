//! Document analysis and chat orchestration.
//!
//! `analyze` runs the full pipeline: validate upload, OCR, build the initial
//! prompt, get advice, seed the session's conversation context. `chat`
//! answers follow-up questions against the extracted notice text.
//!
//! The session context lock is held for the duration of each operation, so
//! concurrent calls on the same session serialize rather than interleave.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::conversation::SessionStore;
use crate::error::AnalysisError;
use crate::llm::{follow_up_prompt, initial_prompt, CompletionBackend};
use crate::ocr::OcrBackend;
use crate::upload::{self, UploadedDocument};

/// Result of analyzing an uploaded notice. Returned to the caller and never
/// stored server-side beyond seeding the conversation context.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// OCR-extracted notice text.
    pub notice_text: String,
    /// Model-generated guidance.
    pub advice: String,
    /// Provider warning when OCR was a partial success.
    pub warning: Option<String>,
}

/// Orchestrates document analysis and follow-up chat.
pub struct AnalysisService {
    ocr: Arc<dyn OcrBackend>,
    completion: Arc<dyn CompletionBackend>,
    sessions: SessionStore,
}

impl AnalysisService {
    pub fn new(ocr: Arc<dyn OcrBackend>, completion: Arc<dyn CompletionBackend>) -> Self {
        Self {
            ocr,
            completion,
            sessions: SessionStore::new(),
        }
    }

    /// Access the session store (used by tests to inspect context state).
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Analyze an uploaded notice: OCR it, generate advice, and reseed the
    /// session's conversation context with the result.
    ///
    /// The context is only mutated once both provider calls have succeeded;
    /// a failed analyze leaves the prior conversation intact.
    #[instrument(skip(self, document), fields(mime_type = %document.mime_type))]
    pub async fn analyze(
        &self,
        session: &str,
        document: UploadedDocument,
    ) -> Result<Analysis, AnalysisError> {
        upload::validate(&document)?;

        let context = self.sessions.context_for(session).await;
        let mut context = context.lock().await;

        let outcome = self.ocr.extract_text(&document).await?;
        info!(
            chars = outcome.text.len(),
            partial = outcome.warning.is_some(),
            "OCR extraction complete"
        );

        let prompt = initial_prompt(&outcome.text);
        let advice = self.completion.complete(&prompt.into_messages()).await?;

        context.reseed(&outcome.text);
        context.append_assistant(advice.clone());

        Ok(Analysis {
            notice_text: outcome.text,
            advice,
            warning: outcome.warning,
        })
    }

    /// Answer a follow-up question.
    ///
    /// When `notice_text` is supplied the session context is reseeded with
    /// it, restarting the conversation; otherwise the question appends to
    /// the existing context.
    #[instrument(skip(self, user_text, notice_text))]
    pub async fn chat(
        &self,
        session: &str,
        user_text: &str,
        notice_text: Option<&str>,
    ) -> Result<String, AnalysisError> {
        if user_text.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "userMessage required".to_string(),
            ));
        }

        let context = self.sessions.context_for(session).await;
        let mut context = context.lock().await;

        if let Some(text) = notice_text {
            context.reseed(text);
        }
        context.append_user(user_text);

        let prompt = follow_up_prompt(notice_text, user_text);
        let reply = self.completion.complete(&prompt.into_messages()).await?;

        context.append_assistant(reply.clone());
        Ok(reply)
    }
}
