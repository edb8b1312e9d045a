// src/ai/prompt.rs
//! The extraction prompt sent alongside every document.
//!
//! The text is reproduced exactly as the model has always received it,
//! including the quirks of its JSON template; edits change model output.

/// Prompt listing every schema key and its accepted values.
pub const EXTRACTION_PROMPT: &str = include_str!("extraction_prompt.txt");
