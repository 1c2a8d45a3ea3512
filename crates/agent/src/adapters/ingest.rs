//! PDF upload ingestion into a local [`KnowledgeBase`].

use crate::service::{DocumentIngest, IngestedDocument};
use axon_core::{AppError, AppResult};
use axon_knowledge::{extract_pdf_text, ContentType, KnowledgeBase};
use std::sync::Arc;

pub struct KnowledgeIngest {
    base: Arc<KnowledgeBase>,
}

impl KnowledgeIngest {
    pub fn new(base: Arc<KnowledgeBase>) -> Self {
        Self { base }
    }
}

#[async_trait::async_trait]
impl DocumentIngest for KnowledgeIngest {
    async fn ingest_pdf(&self, filename: &str, bytes: Vec<u8>) -> AppResult<IngestedDocument> {
        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
            .await
            .map_err(|e| AppError::Knowledge(format!("PDF extraction task failed: {}", e)))??;

        if text.trim().is_empty() {
            return Err(AppError::InvalidUpload(format!(
                "No extractable text found in '{}'",
                filename
            )));
        }

        let stats = self.base.ingest_text(filename, ContentType::Pdf, &text).await?;

        Ok(IngestedDocument {
            chunks: stats.chunks_count,
            text,
        })
    }
}
