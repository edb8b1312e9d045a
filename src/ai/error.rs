// src/ai/error.rs

use thiserror::Error;

/// Terminal failures of one extraction, after retries are exhausted.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("upload failed after {attempts} attempts: {last_error}")]
    UploadFailed { attempts: u32, last_error: String },
    #[error("generation failed after {attempts} attempts: {last_error}")]
    GenerationFailed { attempts: u32, last_error: String },
    #[error("invalid response after {attempts} attempts: {reason}")]
    InvalidResponse { attempts: u32, reason: String },
}

impl ExtractionError {
    /// Short label for progress lines and the run journal.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::UploadFailed { .. } => "upload_failed",
            ExtractionError::GenerationFailed { .. } => "generation_failed",
            ExtractionError::InvalidResponse { .. } => "invalid_response",
        }
    }
}
