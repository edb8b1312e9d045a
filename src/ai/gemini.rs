// src/ai/gemini.rs
//! Gemini REST adapter for `DocumentService`.
//!
//! ## Calls
//!
//! - Upload: resumable Files API (`start`, then `upload, finalize`)
//! - Generate: `models/{model}:generateContent` with a `file_data` part and
//!   the prompt as a text part
//! - Release: `DELETE` on the file resource
//!
//! All requests are blocking; the pipeline has one document in flight. An
//! upload that never becomes active is deleted before the error is returned,
//! so retries do not leave orphaned files behind.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::backoff::{Sleeper, ThreadSleeper};
use super::service::{DocumentService, FileHandle, ServiceError, ServiceResult};

const API_BASE: &str = "https://generativelanguage.googleapis.com";
const PDF_MIME: &str = "application/pdf";
const ACTIVE_POLL_LIMIT: u32 = 10;
const ACTIVE_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    sleeper: Box<dyn Sleeper>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteFile {
    name: String,
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn check_status(response: Response) -> ServiceResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().unwrap_or_default();
        Err(ServiceError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl GeminiService {
    pub fn new(api_key: String, model: String, timeout: Duration) -> ServiceResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            sleeper: Box::new(ThreadSleeper),
        })
    }

    fn get_file(&self, name: &str) -> ServiceResult<RemoteFile> {
        let response = self
            .client
            .get(format!("{}/v1beta/{}", API_BASE, name))
            .header("x-goog-api-key", &self.api_key)
            .send()?;
        Ok(check_status(response)?.json()?)
    }

    fn delete_file(&self, name: &str) -> ServiceResult<()> {
        let response = self
            .client
            .delete(format!("{}/v1beta/{}", API_BASE, name))
            .header("x-goog-api-key", &self.api_key)
            .send()?;
        check_status(response)?;
        Ok(())
    }
}

/// Poll until a freshly uploaded file leaves `PROCESSING`; generation needs it
/// active.
fn wait_until_active(
    mut file: RemoteFile,
    sleeper: &dyn Sleeper,
    fetch: &mut impl FnMut(&str) -> ServiceResult<RemoteFile>,
) -> ServiceResult<RemoteFile> {
    let mut polls = 0;
    while file.state.as_deref() == Some("PROCESSING") {
        if polls >= ACTIVE_POLL_LIMIT {
            return Err(ServiceError::Protocol(format!(
                "{} still processing after {} checks",
                file.name, polls
            )));
        }
        sleeper.sleep(ACTIVE_POLL_INTERVAL);
        file = fetch(&file.name)?;
        polls += 1;
    }
    if file.state.as_deref() == Some("FAILED") {
        return Err(ServiceError::Protocol(format!(
            "service failed to process {}",
            file.name
        )));
    }
    Ok(file)
}

/// `wait_until_active`, deleting the upload (best effort) when it fails.
fn settle_upload(
    file: RemoteFile,
    sleeper: &dyn Sleeper,
    mut fetch: impl FnMut(&str) -> ServiceResult<RemoteFile>,
    delete: impl FnOnce(&str) -> ServiceResult<()>,
) -> ServiceResult<RemoteFile> {
    let name = file.name.clone();
    wait_until_active(file, sleeper, &mut fetch).map_err(|e| {
        match delete(&name) {
            Ok(()) => debug!("Deleted unusable upload {}", name),
            Err(del) => warn!("Could not delete unusable upload {}: {}", name, del),
        }
        e
    })
}

impl DocumentService for GeminiService {
    fn upload(&self, path: &Path) -> ServiceResult<FileHandle> {
        let bytes = std::fs::read(path)?;
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "proposal.pdf".to_string());

        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", API_BASE))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", PDF_MIME)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()?;
        let start = check_status(start)?;
        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Protocol("missing x-goog-upload-url header".into()))?;

        let finish = self
            .client
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()?;
        let uploaded: UploadResponse = check_status(finish)?.json()?;
        debug!("Uploaded {:?} as {}", path, uploaded.file.name);

        let file = settle_upload(
            uploaded.file,
            self.sleeper.as_ref(),
            |name| self.get_file(name),
            |name| self.delete_file(name),
        )?;
        Ok(FileHandle {
            name: file.name,
            uri: file.uri,
            mime_type: file.mime_type.unwrap_or_else(|| PDF_MIME.to_string()),
        })
    }

    fn generate(&self, handle: &FileHandle, prompt: &str) -> ServiceResult<String> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "file_data": { "mime_type": handle.mime_type, "file_uri": handle.uri } },
                    { "text": prompt }
                ]
            }]
        });
        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                API_BASE, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;
        let parsed: GenerateResponse = check_status(response)?.json()?;

        if parsed.candidates.is_empty() {
            if let Some(reason) = parsed
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
            {
                return Err(ServiceError::Protocol(format!("request blocked: {}", reason)));
            }
        }
        Ok(parsed.text())
    }

    fn release(&self, handle: &FileHandle) -> ServiceResult<()> {
        self.delete_file(&handle.name)
    }
}
