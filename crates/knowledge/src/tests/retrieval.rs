//! End-to-end retrieval over a knowledge base on disk.

use crate::index::{init_index, insert_document, query_chunks};
use crate::types::{KnowledgeChunk, KnowledgeSource, LearnOptions};
use super::FailingOllama;
use crate::{ContentType, KnowledgeBase, KnowledgeBaseConfig, OllamaEmbeddings};
use chrono::Utc;
use std::fs;
use std::sync::Arc;
use tempfile::{NamedTempFile, TempDir};

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

fn chunk(id: &str, embedding: Vec<f32>) -> KnowledgeChunk {
    KnowledgeChunk {
        id: id.to_string(),
        source_id: "source1".to_string(),
        position: 0,
        text: format!("Text {}", id),
        embedding: Some(embedding),
        metadata: serde_json::json!({}),
    }
}

#[test]
fn test_scores_are_ordered_and_filtered() {
    let temp_file = NamedTempFile::new().unwrap();
    let mut conn = init_index(temp_file.path()).unwrap();

    let source = KnowledgeSource {
        id: "source1".to_string(),
        name: "notes.txt".to_string(),
        content_type: "text".to_string(),
        learned_at: Utc::now(),
        size_bytes: 100,
    };
    insert_document(
        &mut conn,
        &source,
        &[
            chunk("a", normalize(&[1.0, 0.0, 0.0])),
            chunk("b", normalize(&[0.7, 0.7, 0.0])),
            chunk("c", normalize(&[0.0, 1.0, 0.0])),
            chunk("d", normalize(&[-1.0, 0.0, 0.0])),
        ],
    )
    .unwrap();

    let results = query_chunks(&conn, &normalize(&[1.0, 0.0, 0.0]), 10, 0.2).unwrap();

    let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert!(results[0].score > 0.99);
    assert!(results[0].score >= results[1].score);
}

#[test]
fn test_top_k_truncates() {
    let temp_file = NamedTempFile::new().unwrap();
    let mut conn = init_index(temp_file.path()).unwrap();
    let source = KnowledgeSource {
        id: "source1".to_string(),
        name: "notes.txt".to_string(),
        content_type: "text".to_string(),
        learned_at: Utc::now(),
        size_bytes: 10,
    };
    let chunks: Vec<KnowledgeChunk> = (0..8)
        .map(|i| chunk(&format!("c{}", i), normalize(&[1.0, i as f32 * 0.1])))
        .collect();
    insert_document(&mut conn, &source, &chunks).unwrap();

    let results = query_chunks(&conn, &[1.0, 0.0], 5, 0.0).unwrap();
    assert_eq!(results.len(), 5);
    assert_eq!(results[0].chunk.id, "c0");
}

#[tokio::test]
async fn test_ingest_and_search_text() {
    let temp = TempDir::new().unwrap();
    let kb = KnowledgeBase::open(temp.path(), "default").unwrap();

    let text = "Travel expenses are reimbursed within 30 days of submitting receipts.\n\n\
                The cafeteria serves pasta every Thursday at noon.";
    let stats = kb
        .ingest_text("policy.txt", ContentType::PlainText, text)
        .await
        .unwrap();
    assert_eq!(stats.chunks_count, 1);

    let hits = kb.search("travel expenses reimbursed", 5).await.unwrap();
    assert!(!hits.is_empty());
    assert!(hits[0].chunk.text.contains("reimbursed"));

    let base_stats = kb.stats().unwrap();
    assert_eq!(base_stats.sources_count, 1);
    assert_eq!(base_stats.chunks_count, 1);
    assert!(base_stats.last_learn_at.is_some());
}

#[tokio::test]
async fn test_search_on_empty_base_returns_nothing() {
    let temp = TempDir::new().unwrap();
    let kb = KnowledgeBase::open(temp.path(), "default").unwrap();
    assert!(kb.search("anything", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_with_unreachable_embedder_fails_after_one_request() {
    let temp = TempDir::new().unwrap();
    let server = FailingOllama::spawn().await;
    let embedder = Arc::new(OllamaEmbeddings::new(&server.url, "nomic-embed-text", 768).unwrap());
    let kb = KnowledgeBase::with_embedder(
        temp.path(),
        KnowledgeBaseConfig::named("default"),
        embedder,
    )
    .unwrap();

    assert!(kb.search("expense policy", 5).await.is_err());
    assert_eq!(server.requests(), 1);
}

#[tokio::test]
async fn test_ingest_empty_text_is_rejected() {
    let temp = TempDir::new().unwrap();
    let kb = KnowledgeBase::open(temp.path(), "default").unwrap();
    assert!(kb
        .ingest_text("blank.txt", ContentType::PlainText, "  \n ")
        .await
        .is_err());
}

#[tokio::test]
async fn test_learn_directory_with_filters_and_clean() {
    let temp = TempDir::new().unwrap();
    let docs = temp.path().join("docs");
    fs::create_dir_all(docs.join("drafts")).unwrap();
    fs::write(docs.join("handbook.md"), "# Leave\n\nEmployees get 25 days of leave.").unwrap();
    fs::write(docs.join("faq.txt"), "Badges are issued at reception.").unwrap();
    fs::write(docs.join("drafts").join("wip.txt"), "Unfinished draft.").unwrap();
    fs::write(docs.join("broken.pdf"), "not really a pdf").unwrap();

    let kb = KnowledgeBase::open(temp.path(), "handbook").unwrap();
    let stats = kb
        .learn(&LearnOptions {
            paths: vec![docs.clone()],
            exclude: vec!["drafts".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(stats.sources_count, 2);
    assert_eq!(stats.skipped_count, 1);
    assert_eq!(kb.stats().unwrap().sources_count, 2);

    kb.clean().unwrap();
    let after = kb.stats().unwrap();
    assert_eq!(after.sources_count, 0);
    assert_eq!(after.chunks_count, 0);
}

#[tokio::test]
async fn test_learn_missing_path_is_an_error() {
    let temp = TempDir::new().unwrap();
    let kb = KnowledgeBase::open(temp.path(), "default").unwrap();
    let result = kb
        .learn(&LearnOptions {
            paths: vec![temp.path().join("nope")],
            ..Default::default()
        })
        .await;
    assert!(result.is_err());
}
