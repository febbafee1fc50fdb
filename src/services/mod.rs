//! Service layer composing the upload gate, OCR, and completion adapters.

pub mod analysis;

pub use analysis::{Analysis, AnalysisService};
