//! Typed JSON extraction from model replies.
//!
//! Models asked for JSON still wrap it in code fences or prose now and then.
//! The parser accepts the outermost `{ ... }` object in the reply and
//! deserializes it; anything else is an inference error.

use axon_core::{AppError, AppResult};
use serde::de::DeserializeOwned;

/// Parse a model reply into `T`.
///
/// # Errors
/// Returns `AppError::Inference` when the reply holds no JSON object or the
/// object does not match `T`.
pub fn parse_structured<T: DeserializeOwned>(reply: &str) -> AppResult<T> {
    let object = extract_json_object(reply).ok_or_else(|| {
        AppError::Inference(format!(
            "Structured reply contains no JSON object: {:?}",
            reply.chars().take(120).collect::<String>()
        ))
    })?;

    serde_json::from_str(object)
        .map_err(|e| AppError::Inference(format!("Malformed structured reply: {}", e)))
}

fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}
