//! Request and response bodies of the agent's external contract.

use crate::trace::TraceEvent;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Execute request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub session_id: String,
    pub query: String,
    #[serde(default = "default_true")]
    pub enable_web_search: bool,
}

/// Execute response: final answer and the ordered trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub response: String,
    pub trace_events: Vec<TraceEvent>,
}

/// Document upload response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub processed_chunks: u32,
    pub document_preview: String,
}
