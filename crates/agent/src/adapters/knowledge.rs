//! Knowledge lookup over a local [`KnowledgeBase`].

use crate::ports::{KnowledgeLookup, LookupOutcome};
use axon_knowledge::KnowledgeBase;
use std::sync::Arc;

/// Top-k search joined into one text block.
pub struct KnowledgeBaseLookup {
    base: Arc<KnowledgeBase>,
    top_k: usize,
}

impl KnowledgeBaseLookup {
    pub fn new(base: Arc<KnowledgeBase>, top_k: usize) -> Self {
        Self { base, top_k }
    }
}

#[async_trait::async_trait]
impl KnowledgeLookup for KnowledgeBaseLookup {
    async fn lookup(&self, query: &str) -> LookupOutcome {
        match self.base.search(query, self.top_k).await {
            Ok(hits) => {
                tracing::debug!(base = self.base.name(), hits = hits.len(), "Knowledge search");
                LookupOutcome::Found(
                    hits.iter()
                        .map(|hit| hit.chunk.text.as_str())
                        .collect::<Vec<_>>()
                        .join("\n\n"),
                )
            }
            Err(e) => LookupOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_knowledge::ContentType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_empty_base_is_found_empty() {
        let temp = TempDir::new().unwrap();
        let base = Arc::new(KnowledgeBase::open(temp.path(), "default").unwrap());
        let lookup = KnowledgeBaseLookup::new(base, 5);

        assert_eq!(lookup.lookup("anything").await, LookupOutcome::Found(String::new()));
    }

    #[tokio::test]
    async fn test_hits_are_joined() {
        let temp = TempDir::new().unwrap();
        let base = Arc::new(KnowledgeBase::open(temp.path(), "default").unwrap());
        base.ingest_text(
            "policy.txt",
            ContentType::PlainText,
            "Expense reports are submitted through the finance portal.",
        )
        .await
        .unwrap();

        let lookup = KnowledgeBaseLookup::new(base, 5);
        match lookup.lookup("How are expense reports submitted?").await {
            LookupOutcome::Found(text) => assert!(text.contains("finance portal")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
