// src/settings/mod.rs
pub mod io;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which model family answers the extraction prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Flash,
    Pro,
}

impl ModelTier {
    pub fn model_name(&self) -> &'static str {
        match self {
            ModelTier::Flash => "gemini-2.5-flash",
            ModelTier::Pro => "gemini-2.5-pro",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Flash => write!(f, "flash"),
            ModelTier::Pro => write!(f, "pro"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub model_tier: ModelTier,
    pub max_attempts: u32,
    /// Re-request responses missing schema keys
    pub strict_schema: bool,
    pub request_timeout_secs: u64,
    pub default_sheet: PathBuf,
    pub default_documents: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            model_tier: ModelTier::default(),
            max_attempts: 3,
            strict_schema: false,
            request_timeout_secs: 300,
            default_sheet: PathBuf::from("./proposals_sheet.xlsx"),
            default_documents: PathBuf::from("./proposals"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"model_tier": "pro", "max_attempts": 5}"#).unwrap();
        assert_eq!(settings.model_tier, ModelTier::Pro);
        assert_eq!(settings.max_attempts, 5);
        assert!(!settings.strict_schema);
        assert_eq!(settings.request_timeout_secs, 300);
        assert_eq!(settings.default_documents, PathBuf::from("./proposals"));
    }

    #[test]
    fn test_model_tier_names() {
        assert_eq!(ModelTier::default().model_name(), "gemini-2.5-flash");
        assert_eq!(ModelTier::Pro.model_name(), "gemini-2.5-pro");
        assert_eq!(serde_json::to_string(&ModelTier::Pro).unwrap(), "\"pro\"");
    }
}
