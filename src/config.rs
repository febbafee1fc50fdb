//! Configuration for provider endpoints and credentials.
//!
//! Settings are read from the environment (a `.env` file is loaded by the
//! binary before anything else). API keys have no defaults; everything else
//! falls back to sensible values.

use serde::{Deserialize, Serialize};

fn default_ocr_endpoint() -> String {
    "https://api.ocr.space/parse/image".to_string()
}

fn default_ocr_timeout_secs() -> u64 {
    30
}

fn default_completion_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_completion_model() -> String {
    "llama3-8b-8192".to_string()
}

fn default_completion_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

/// OCR provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSettings {
    /// API key (env: OCR_API_KEY).
    pub api_key: String,
    /// Parse endpoint URL.
    #[serde(default = "default_ocr_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds.
    #[serde(default = "default_ocr_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries on transient transport failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_ocr_endpoint(),
            timeout_secs: default_ocr_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Completion provider settings (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// API key (env: GROQ_API_KEY).
    pub api_key: String,
    /// Chat completions endpoint URL.
    #[serde(default = "default_completion_endpoint")]
    pub endpoint: String,
    /// Model name.
    #[serde(default = "default_completion_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries on transient transport failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_completion_endpoint(),
            model: default_completion_model(),
            timeout_secs: default_completion_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

/// Service settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ocr: OcrSettings,
    #[serde(default)]
    pub completion: CompletionSettings,
}

impl Settings {
    /// Load settings from the environment.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(key) = std::env::var("OCR_API_KEY") {
            settings.ocr.api_key = key;
        }
        if let Ok(endpoint) = std::env::var("OCR_ENDPOINT") {
            settings.ocr.endpoint = endpoint;
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            settings.completion.api_key = key;
        }
        if let Ok(endpoint) = std::env::var("COMPLETION_ENDPOINT") {
            settings.completion.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("COMPLETION_MODEL") {
            settings.completion.model = model;
        }

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ocr.endpoint, "https://api.ocr.space/parse/image");
        assert_eq!(settings.completion.model, "llama3-8b-8192");
        assert_eq!(settings.ocr.max_retries, 2);
        assert_eq!(settings.completion.timeout_secs, 60);
    }

    #[test]
    fn test_deserialize_with_partial_fields() {
        let settings: Settings = serde_json::from_str(
            r#"{"completion": {"api_key": "k", "model": "llama-3.1-70b"}}"#,
        )
        .unwrap();
        assert_eq!(settings.completion.model, "llama-3.1-70b");
        assert_eq!(settings.completion.api_key, "k");
        // Unspecified fields fall back to defaults.
        assert_eq!(settings.ocr.timeout_secs, 30);
    }
}
