//! NoticeLens - legal notice analysis service.
//!
//! Upload a scanned legal notice (image or PDF), get its text back via OCR
//! along with structured "Do / Don't / Next Steps" guidance from a language
//! model, then ask follow-up questions grounded in the extracted text.

pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod ocr;
pub mod server;
pub mod services;
pub mod upload;
