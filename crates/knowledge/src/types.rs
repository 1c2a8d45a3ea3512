//! Knowledge system type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration of one knowledge base, stored as `config.yaml` in its directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Taken from the base directory, never from the file
    #[serde(skip)]
    pub name: String,

    #[serde(default)]
    pub embedding: EmbeddingSettings,

    #[serde(default)]
    pub chunking: ChunkingSettings,

    /// Minimum cosine similarity for a chunk to count as relevant
    #[serde(default = "default_min_score", rename = "minScore")]
    pub min_score: f32,
}

impl KnowledgeBaseConfig {
    /// Default configuration for the base `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            embedding: EmbeddingSettings::default(),
            chunking: ChunkingSettings::default(),
            min_score: default_min_score(),
        }
    }
}

fn default_min_score() -> f32 {
    0.20
}

fn default_dimensions() -> usize {
    384
}

/// Embedding backend of a base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum EmbeddingSettings {
    /// Hashed character trigrams; offline and deterministic
    Trigram {
        #[serde(default = "default_dimensions")]
        dimensions: usize,
    },
    /// Neural embeddings from an Ollama server
    Ollama {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        endpoint: Option<String>,
        model: String,
        #[serde(default = "default_dimensions")]
        dimensions: usize,
    },
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        EmbeddingSettings::Trigram {
            dimensions: default_dimensions(),
        }
    }
}

/// Chunk sizes in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub size: usize,
    pub overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 200,
        }
    }
}

/// A source document stored in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSource {
    /// Unique source identifier
    pub id: String,

    /// Display name (file name or upload name)
    pub name: String,

    /// Content type label ("pdf", "markdown", "text")
    pub content_type: String,

    /// When this source was indexed
    pub learned_at: DateTime<Utc>,

    /// Extracted text size in bytes
    pub size_bytes: u64,
}

/// A text chunk with embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Source document ID
    pub source_id: String,

    /// Position within source
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Metadata (e.g., character count)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A chunk paired with its similarity to a query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: KnowledgeChunk,
    pub score: f32,
}

/// Options for the learn operation.
#[derive(Debug, Clone, Default)]
pub struct LearnOptions {
    /// Local files or directories to learn from
    pub paths: Vec<PathBuf>,

    /// Substring patterns a path must contain (any)
    pub include: Vec<String>,

    /// Substring patterns that exclude a path
    pub exclude: Vec<String>,

    /// Reset the base before learning
    pub reset: bool,
}

/// Result of ingesting one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Source id assigned to the document
    pub source_id: String,

    /// Number of chunks stored
    pub chunks_count: u32,

    /// Extracted text size in bytes
    pub bytes_processed: u64,
}

/// Statistics from a learn operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnStats {
    /// Number of sources processed
    pub sources_count: u32,

    /// Number of sources skipped because they failed to parse or embed
    pub skipped_count: u32,

    /// Number of chunks created
    pub chunks_count: u32,

    /// Total bytes processed
    pub bytes_processed: u64,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for a knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    /// Base name
    pub base_name: String,

    /// Number of sources
    pub sources_count: u32,

    /// Number of chunks
    pub chunks_count: u32,

    /// Database size in bytes
    pub db_size_bytes: u64,

    /// Most recent ingestion time
    pub last_learn_at: Option<DateTime<Utc>>,
}

/// Chunk produced by the chunker, before embedding.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub source_id: String,
    pub position: u32,
    pub text: String,
    pub metadata: serde_json::Value,
}
