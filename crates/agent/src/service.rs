//! Service facade: session handling around the routing machine, plus
//! document upload.

use crate::machine::RoutingMachine;
use crate::schema::{AgentResponse, UploadResponse};
use crate::session::{SessionLocks, SessionStore};
use crate::state::{ConversationState, Role};
use axon_core::{AppError, AppResult};
use std::sync::Arc;

/// Characters of extracted text echoed back after an upload.
const UPLOAD_PREVIEW_CHARS: usize = 500;

/// Outcome of indexing one uploaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedDocument {
    pub chunks: u32,
    pub text: String,
}

/// Parses and indexes uploaded PDF documents.
#[async_trait::async_trait]
pub trait DocumentIngest: Send + Sync {
    async fn ingest_pdf(&self, filename: &str, bytes: Vec<u8>) -> AppResult<IngestedDocument>;
}

/// Runs queries against per-session conversation state.
pub struct AgentService {
    machine: RoutingMachine,
    sessions: Arc<dyn SessionStore>,
    locks: SessionLocks,
    ingest: Option<Arc<dyn DocumentIngest>>,
}

impl AgentService {
    pub fn new(machine: RoutingMachine, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            machine,
            sessions,
            locks: SessionLocks::new(),
            ingest: None,
        }
    }

    /// Enable document upload.
    pub fn with_ingest(mut self, ingest: Arc<dyn DocumentIngest>) -> Self {
        self.ingest = Some(ingest);
        self
    }

    /// Answer `query` in the context of `session_id`.
    ///
    /// State is saved whether or not the run succeeds.
    pub async fn execute(
        &self,
        session_id: &str,
        query: &str,
        enable_web_search: bool,
    ) -> AppResult<AgentResponse> {
        let _guard = self.locks.acquire(session_id).await?;

        let mut state = self.load_state(session_id).await?;
        state.begin_turn(query, enable_web_search);
        let turns_before = state.messages.len();

        tracing::info!(
            session_id,
            web_search_enabled = enable_web_search,
            history = turns_before,
            "Starting agent run"
        );

        let run = self.machine.run(&mut state).await;

        if let Err(save_err) = self.save_state(session_id, &state).await {
            match &run {
                Ok(_) => return Err(save_err),
                Err(run_err) => tracing::error!(
                    session_id,
                    "Failed to save session after failed run ({}): {}",
                    run_err,
                    save_err
                ),
            }
        }

        let trace_events = run.map_err(|e| {
            tracing::error!(session_id, "Agent run failed: {}", e);
            e
        })?;

        let response = state.messages[turns_before..]
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or(AppError::MissingFinalAnswer)?;

        tracing::info!(session_id, steps = trace_events.len(), "Agent run completed");

        Ok(AgentResponse {
            response,
            trace_events,
        })
    }

    async fn load_state(&self, session_id: &str) -> AppResult<ConversationState> {
        let sessions = Arc::clone(&self.sessions);
        let id = session_id.to_string();
        let loaded = tokio::task::spawn_blocking(move || sessions.load(&id))
            .await
            .map_err(|e| AppError::Session(format!("Session load task failed: {}", e)))??;
        Ok(loaded.unwrap_or_default())
    }

    async fn save_state(&self, session_id: &str, state: &ConversationState) -> AppResult<()> {
        let sessions = Arc::clone(&self.sessions);
        let id = session_id.to_string();
        let snapshot = state.clone();
        tokio::task::spawn_blocking(move || sessions.save(&id, &snapshot))
            .await
            .map_err(|e| AppError::Session(format!("Session save task failed: {}", e)))?
    }

    /// Index an uploaded PDF into the knowledge base.
    pub async fn upload_document(&self, filename: &str, bytes: Vec<u8>) -> AppResult<UploadResponse> {
        if !has_pdf_extension(filename) {
            return Err(AppError::InvalidUpload(
                "Only PDF files are supported.".to_string(),
            ));
        }

        let ingest = self
            .ingest
            .as_ref()
            .ok_or_else(|| AppError::Knowledge("Document upload is not configured".to_string()))?;

        let document = ingest.ingest_pdf(filename, bytes).await?;

        tracing::info!(filename, chunks = document.chunks, "Processed uploaded document");

        Ok(UploadResponse {
            message: format!("PDF '{}' successfully uploaded and indexed.", filename),
            filename: filename.to_string(),
            processed_chunks: document.chunks,
            document_preview: format!(
                "{}....",
                document.text.chars().take(UPLOAD_PREVIEW_CHARS).collect::<String>()
            ),
        })
    }
}

fn has_pdf_extension(filename: &str) -> bool {
    filename.ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_check() {
        assert!(has_pdf_extension("handbook.pdf"));
        assert!(has_pdf_extension(".pdf"));
        assert!(!has_pdf_extension("HANDBOOK.PDF"));
        assert!(!has_pdf_extension("handbook.Pdf"));
        assert!(!has_pdf_extension("handbook.txt"));
        assert!(!has_pdf_extension("pdf"));
        assert!(!has_pdf_extension("handbook.pdf.exe"));
    }
}
