// src/ai/service.rs
//! Capability interface of the document-understanding service.

use std::path::Path;

use thiserror::Error;

/// Opaque reference to a document held by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    /// Service-side resource name, e.g. `files/abc123`
    pub name: String,
    /// URI passed back to the model in generation requests
    pub uri: String,
    pub mime_type: String,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Unexpected service response: {0}")]
    Protocol(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Upload, prompt and release documents.
pub trait DocumentService {
    fn upload(&self, path: &Path) -> ServiceResult<FileHandle>;

    /// Run the model over an uploaded document and return its response text.
    fn generate(&self, handle: &FileHandle, prompt: &str) -> ServiceResult<String>;

    fn release(&self, handle: &FileHandle) -> ServiceResult<()>;
}
