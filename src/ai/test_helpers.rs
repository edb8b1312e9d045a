// src/ai/test_helpers.rs
//! Scripted `DocumentService` for unit tests: every call pops the next
//! scripted outcome and is recorded.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use super::service::{DocumentService, FileHandle, ServiceError, ServiceResult};

#[derive(Debug, Clone)]
pub enum Step<T> {
    Ok(T),
    Fail(&'static str),
}

#[derive(Default)]
pub struct ScriptedService {
    uploads: RefCell<VecDeque<Step<()>>>,
    generations: RefCell<VecDeque<Step<String>>>,
    fail_release: Cell<bool>,
    pub uploaded: RefCell<Vec<PathBuf>>,
    pub prompts: RefCell<Vec<String>>,
    pub released: RefCell<Vec<String>>,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_fails(self, times: usize) -> Self {
        for _ in 0..times {
            self.uploads.borrow_mut().push_back(Step::Fail("connection reset"));
        }
        self
    }

    /// Queue a successful generation returning `text`.
    pub fn responds(self, text: impl Into<String>) -> Self {
        self.generations.borrow_mut().push_back(Step::Ok(text.into()));
        self
    }

    pub fn generation_fails(self, times: usize) -> Self {
        for _ in 0..times {
            self.generations.borrow_mut().push_back(Step::Fail("deadline exceeded"));
        }
        self
    }

    pub fn release_fails(self) -> Self {
        self.fail_release.set(true);
        self
    }

    pub fn upload_calls(&self) -> usize {
        self.uploaded.borrow().len()
    }

    pub fn generate_calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn total_calls(&self) -> usize {
        self.upload_calls() + self.generate_calls()
    }
}

impl DocumentService for ScriptedService {
    fn upload(&self, path: &Path) -> ServiceResult<FileHandle> {
        self.uploaded.borrow_mut().push(path.to_path_buf());
        let n = self.uploaded.borrow().len();
        match self.uploads.borrow_mut().pop_front() {
            Some(Step::Fail(msg)) => Err(ServiceError::Protocol(msg.to_string())),
            _ => Ok(FileHandle {
                name: format!("files/doc{}", n),
                uri: format!("https://example.invalid/files/doc{}", n),
                mime_type: "application/pdf".to_string(),
            }),
        }
    }

    fn generate(&self, _handle: &FileHandle, prompt: &str) -> ServiceResult<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        match self.generations.borrow_mut().pop_front() {
            Some(Step::Ok(text)) => Ok(text),
            Some(Step::Fail(msg)) => Err(ServiceError::Status {
                status: 503,
                body: msg.to_string(),
            }),
            None => Err(ServiceError::Protocol("no scripted response".to_string())),
        }
    }

    fn release(&self, handle: &FileHandle) -> ServiceResult<()> {
        self.released.borrow_mut().push(handle.name.clone());
        if self.fail_release.get() {
            Err(ServiceError::Status {
                status: 500,
                body: "internal".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// A complete, well-formed response with value `v_<LETTER>` in every field.
pub fn complete_response() -> String {
    let pairs: Vec<String> = crate::sheets::Field::ALL
        .iter()
        .map(|f| format!("    \"{}\": \"v_{}\"", f.key(), f.letter()))
        .collect();
    format!("```json\n{{\n{}\n}}\n```", pairs.join(",\n"))
}

/// Like `complete_response`, but every value is `value`.
pub fn response_with_value(value: &str) -> String {
    let pairs: Vec<String> = crate::sheets::Field::ALL
        .iter()
        .map(|f| format!("\"{}\": \"{}\"", f.key(), value))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}
