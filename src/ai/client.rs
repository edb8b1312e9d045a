// src/ai/client.rs
//! Extraction Client
//!
//! Runs one document through the service: upload, generate, validate, release.
//!
//! ## Retry policy
//!
//! - Upload: any error is retried after a backoff sleep, up to `max_attempts`
//! - Generation: transport/service errors sleep and retry; undecodable
//!   responses are re-requested right away
//! - Strict mode: a decoded response missing schema keys is re-requested; once
//!   attempts run out the latest decoded response is used as-is
//!
//! The uploaded file is released whatever the outcome. Release errors are
//! only logged.

use std::path::Path;

use tracing::{debug, info, warn};

use super::backoff::Backoff;
use super::error::ExtractionError;
use super::parser::{parse_response, snippet, ExtractionResult};
use super::prompt::EXTRACTION_PROMPT;
use super::service::{DocumentService, FileHandle};

/// Anything that can turn a document into extracted fields.
pub trait Extractor {
    fn extract(&mut self, document: &Path) -> Result<ExtractionResult, ExtractionError>;
}

pub struct ExtractionClient<S: DocumentService> {
    service: S,
    backoff: Backoff,
    strict: bool,
}

impl<S: DocumentService> ExtractionClient<S> {
    pub fn new(service: S, backoff: Backoff, strict: bool) -> Self {
        Self {
            service,
            backoff,
            strict,
        }
    }

    #[cfg(test)]
    pub fn service(&self) -> &S {
        &self.service
    }

    fn upload_with_retry(&mut self, document: &Path) -> Result<FileHandle, ExtractionError> {
        let max_attempts = self.backoff.max_attempts();
        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            match self.service.upload(document) {
                Ok(handle) => return Ok(handle),
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < max_attempts {
                        let delay = self.backoff.wait(attempt);
                        warn!(
                            "  ⚠ Upload failed (attempt {}/{}). Error: {}. Retried after {:.1}s",
                            attempt,
                            max_attempts,
                            e,
                            delay.as_secs_f64()
                        );
                    } else {
                        warn!("  ⚠ Upload failed (attempt {}/{}). Error: {}", attempt, max_attempts, e);
                    }
                }
            }
        }
        Err(ExtractionError::UploadFailed {
            attempts: max_attempts,
            last_error,
        })
    }

    fn generate_with_retry(&mut self, handle: &FileHandle) -> Result<ExtractionResult, ExtractionError> {
        let max_attempts = self.backoff.max_attempts();
        let mut last_failure: Option<ExtractionError> = None;
        let mut incomplete: Option<ExtractionResult> = None;

        for attempt in 1..=max_attempts {
            let text = match self.service.generate(handle, EXTRACTION_PROMPT) {
                Ok(text) => text,
                Err(e) => {
                    warn!("  ⚠ Error during analysis: {}", e);
                    last_failure = Some(ExtractionError::GenerationFailed {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                    if attempt < max_attempts {
                        let delay = self.backoff.wait(attempt);
                        info!(
                            "  Retried generation (attempt {}/{}) after {:.1}s",
                            attempt + 1,
                            max_attempts,
                            delay.as_secs_f64()
                        );
                    }
                    continue;
                }
            };

            let result = match parse_response(&text) {
                Ok(result) => result,
                Err(reason) => {
                    warn!("  ⚠ Error parsing JSON response: {}", reason);
                    debug!("  Raw response (truncated): {}", snippet(&text, 200));
                    last_failure = Some(ExtractionError::InvalidResponse {
                        attempts: attempt,
                        reason: reason.to_string(),
                    });
                    continue;
                }
            };

            let missing = result.missing_fields();
            if self.strict && !missing.is_empty() && attempt < max_attempts {
                warn!(
                    "  ⚠ Missing fields: {:?}. Retrying (attempt {}/{})...",
                    missing.iter().map(|f| f.key()).collect::<Vec<_>>(),
                    attempt + 1,
                    max_attempts
                );
                incomplete = Some(result);
                continue;
            }
            return Ok(result);
        }

        if let Some(result) = incomplete {
            warn!("  ⚠ Using last incomplete response; missing fields get the placeholder");
            return Ok(result);
        }
        Err(last_failure.unwrap_or(ExtractionError::GenerationFailed {
            attempts: max_attempts,
            last_error: "no attempts made".to_string(),
        }))
    }

    fn release_quietly(&self, handle: &FileHandle) {
        if let Err(e) = self.service.release(handle) {
            debug!("Ignoring failure to release {}: {}", handle.name, e);
        }
    }
}

impl<S: DocumentService> Extractor for ExtractionClient<S> {
    fn extract(&mut self, document: &Path) -> Result<ExtractionResult, ExtractionError> {
        info!("  Uploading and analyzing {:?}...", document.file_name().unwrap_or_default());
        let handle = self.upload_with_retry(document)?;
        let outcome = self.generate_with_retry(&handle);
        self.release_quietly(&handle);
        if let Err(e) = &outcome {
            warn!("  ⚠ Final failure: {}", e);
        }
        outcome
    }
}
