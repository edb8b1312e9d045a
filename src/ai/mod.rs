// src/ai/mod.rs
//! Document extraction through the generative model.

pub mod backoff;
pub mod client;
pub mod error;
pub mod gemini;
pub mod parser;
pub mod prompt;
pub mod service;

#[cfg(test)]
pub mod test_helpers;

pub use backoff::{Backoff, BackoffPolicy};
pub use client::{ExtractionClient, Extractor};
pub use error::ExtractionError;
pub use gemini::GeminiService;
pub use parser::ExtractionResult;
pub use service::{DocumentService, FileHandle, ServiceError};
