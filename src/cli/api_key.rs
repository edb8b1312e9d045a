// src/cli/api_key.rs
//! API key lookup: `GENAI_API_KEY` (a `.env` file is honoured) first, then the
//! OS keyring entry written by `set-api-key`.

use std::io::{self, BufRead};

use tracing::{debug, info};

use super::error::AppError;

pub const API_KEY_ENV: &str = "GENAI_API_KEY";
pub const KEYRING_SERVICE_NAME: &str = "proposal_extractor";
pub const KEYRING_API_KEY_USERNAME: &str = "llm_api_key";

pub fn resolve_api_key() -> Result<String, AppError> {
    pick_api_key(std::env::var(API_KEY_ENV).ok(), read_keyring)
}

fn read_keyring() -> Result<Option<String>, AppError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE_NAME, KEYRING_API_KEY_USERNAME)?;
    match entry.get_password() {
        Ok(key) => Ok(Some(key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn pick_api_key(
    env_value: Option<String>,
    stored: impl FnOnce() -> Result<Option<String>, AppError>,
) -> Result<String, AppError> {
    if let Some(key) = env_value.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
        debug!("Using API key from {}", API_KEY_ENV);
        return Ok(key);
    }
    match stored()? {
        Some(key) if !key.trim().is_empty() => {
            debug!("Using API key from keyring");
            Ok(key.trim().to_string())
        }
        _ => Err(AppError::MissingApiKey),
    }
}

/// `set-api-key`: store (or with `clear`, delete) the keyring entry.
pub fn run(key: Option<String>, clear: bool) -> Result<(), AppError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE_NAME, KEYRING_API_KEY_USERNAME)?;
    if clear {
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                info!("API key removed from keyring.");
                println!("API key cleared.");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }
    }

    let key = match key {
        Some(key) => key,
        None => {
            println!("Paste the API key and press Enter:");
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line
        }
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(AppError::MissingApiKey);
    }
    entry.set_password(key)?;
    info!("API key stored in keyring.");
    println!("API key saved.");
    Ok(())
}
