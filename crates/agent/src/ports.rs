//! Capabilities the routing machine consumes.
//!
//! Lookups never fail with an error: a failed lookup is a value the machine
//! handles inline by falling back to the next route. Inference failures are
//! errors and abort the run.

use axon_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use std::fmt;

/// Result of a knowledge or web lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Retrieved text; may be empty when nothing matched
    Found(String),

    /// Recoverable failure with a diagnostic reason
    Failed(String),
}

/// Knowledge base search.
#[async_trait::async_trait]
pub trait KnowledgeLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> LookupOutcome;
}

/// Live web search.
#[async_trait::async_trait]
pub trait WebLookup: Send + Sync {
    async fn lookup(&self, query: &str) -> LookupOutcome;
}

/// Which step an inference call serves; adapters may pick a model per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferenceRole {
    Router,
    Judge,
    Answer,
}

impl fmt::Display for InferenceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InferenceRole::Router => "router",
            InferenceRole::Judge => "judge",
            InferenceRole::Answer => "answer",
        })
    }
}

/// One rendered inference call.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub role: InferenceRole,
    pub system: Option<String>,
    pub user: String,
}

/// Language model inference.
#[async_trait::async_trait]
pub trait InferencePort: Send + Sync {
    /// Run the request and return the JSON object the model produced.
    async fn infer_json(&self, request: &InferenceRequest) -> AppResult<serde_json::Value>;

    /// Run the request and return free-form text.
    async fn infer_text(&self, request: &InferenceRequest) -> AppResult<String>;
}

/// Run a structured inference call and decode it into `T`.
///
/// Output that does not match `T` is an inference error, never a default.
pub async fn infer_structured<T: DeserializeOwned>(
    port: &dyn InferencePort,
    request: &InferenceRequest,
) -> AppResult<T> {
    let value = port.infer_json(request).await?;
    serde_json::from_value(value).map_err(|e| {
        AppError::Inference(format!("Malformed {} output: {}", request.role, e))
    })
}
