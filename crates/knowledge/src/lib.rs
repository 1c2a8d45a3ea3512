//! Knowledge base management.
//!
//! Local-first retrieval over documents stored in SQLite with embeddings.
//! A [`KnowledgeBase`] owns one named base under `.axon/knowledge/<name>/`.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod parser;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::BaseLayout;
pub use embeddings::{EmbeddingProvider, OllamaEmbeddings, TrigramProvider};
pub use parser::{extract_pdf_text, ContentType};
pub use types::{
    BaseStats, ChunkingSettings, EmbeddingSettings, IngestStats, KnowledgeBaseConfig,
    KnowledgeChunk, KnowledgeSource, LearnOptions, LearnStats, ScoredChunk,
};

use axon_core::{AppError, AppResult};
use chrono::Utc;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use walkdir::WalkDir;

/// A named knowledge base backed by a SQLite index.
pub struct KnowledgeBase {
    config: KnowledgeBaseConfig,
    index_path: PathBuf,
    conn: Arc<Mutex<Connection>>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("name", &self.config.name)
            .field("index_path", &self.index_path)
            .field("embedder", &self.embedder)
            .finish()
    }
}

impl KnowledgeBase {
    /// Open (creating if needed) the base `name` inside `workspace`.
    pub fn open(workspace: &Path, name: &str) -> AppResult<Self> {
        let layout = BaseLayout::new(workspace, name);
        let config = config::load_or_init(&layout, name)?;
        let embedder = embeddings::create_provider(&config.embedding)?;
        Self::with_embedder(workspace, config, embedder)
    }

    /// Open a base with an explicit embedding provider.
    pub fn with_embedder(
        workspace: &Path,
        config: KnowledgeBaseConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        config.validate()?;
        let index_path = BaseLayout::new(workspace, &config.name).index_path();
        let conn = index::init_index(&index_path)?;

        tracing::debug!(
            base = %config.name,
            provider = embedder.provider_name(),
            "Opened knowledge base"
        );

        Ok(Self {
            config,
            index_path,
            conn: Arc::new(Mutex::new(conn)),
            embedder,
        })
    }

    /// Name of this base.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration of this base.
    pub fn config(&self) -> &KnowledgeBaseConfig {
        &self.config
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        lock_index(&self.conn)
    }

    /// Run `f` against the index on the blocking pool.
    async fn with_index<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock_index(&conn)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| AppError::Knowledge(format!("Index task failed: {}", e)))?
    }

    /// Chunk, embed and store a document's extracted text.
    pub async fn ingest_text(
        &self,
        name: &str,
        content_type: ContentType,
        text: &str,
    ) -> AppResult<IngestStats> {
        let source_id = uuid::Uuid::new_v4().to_string();
        let candidates = chunker::chunk_text(
            &source_id,
            text,
            self.config.chunking.size,
            self.config.chunking.overlap,
        );

        if candidates.is_empty() {
            return Err(AppError::Knowledge(format!(
                "No text content to index in '{}'",
                name
            )));
        }

        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != candidates.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                candidates.len()
            )));
        }

        let chunks: Vec<KnowledgeChunk> = candidates
            .into_iter()
            .zip(embeddings)
            .map(|(candidate, embedding)| KnowledgeChunk {
                id: format!("{}-{}", candidate.source_id, candidate.position),
                source_id: candidate.source_id,
                position: candidate.position,
                text: candidate.text,
                embedding: Some(embedding),
                metadata: candidate.metadata,
            })
            .collect();

        let source = KnowledgeSource {
            id: source_id.clone(),
            name: name.to_string(),
            content_type: content_type.as_str().to_string(),
            learned_at: Utc::now(),
            size_bytes: text.len() as u64,
        };

        let chunks_count = chunks.len() as u32;
        let bytes_processed = source.size_bytes;
        self.with_index(move |conn| index::insert_document(conn, &source, &chunks))
            .await?;

        tracing::info!(
            base = %self.config.name,
            source = %name,
            chunks = chunks_count,
            "Indexed document"
        );

        Ok(IngestStats {
            source_id,
            chunks_count,
            bytes_processed,
        })
    }

    /// Parse and ingest a single local file.
    pub async fn ingest_file(&self, path: &Path) -> AppResult<IngestStats> {
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || parser::parse_file(&owned))
            .await
            .map_err(|e| AppError::Knowledge(format!("Parser task failed: {}", e)))??;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        self.ingest_text(&name, ContentType::from_path(path), &text)
            .await
    }

    /// Learn from local files and directories.
    ///
    /// Files that fail to parse or embed are skipped and counted.
    pub async fn learn(&self, options: &LearnOptions) -> AppResult<LearnStats> {
        let start = Instant::now();

        if options.reset {
            self.clean()?;
        }

        let mut files = Vec::new();
        for path in &options.paths {
            if path.is_file() {
                files.push(path.clone());
            } else if path.is_dir() {
                files.extend(
                    WalkDir::new(path)
                        .follow_links(false)
                        .into_iter()
                        .filter_map(|e| e.ok())
                        .filter(|e| e.file_type().is_file())
                        .map(|e| e.into_path())
                        .filter(|p| should_include(p, options)),
                );
            } else {
                return Err(AppError::Knowledge(format!("Path not found: {:?}", path)));
            }
        }

        let mut stats = LearnStats {
            sources_count: 0,
            skipped_count: 0,
            chunks_count: 0,
            bytes_processed: 0,
            duration_secs: 0.0,
        };

        for file in &files {
            match self.ingest_file(file).await {
                Ok(ingested) => {
                    stats.sources_count += 1;
                    stats.chunks_count += ingested.chunks_count;
                    stats.bytes_processed += ingested.bytes_processed;
                }
                Err(e) => {
                    tracing::warn!("Skipping {:?}: {}", file, e);
                    stats.skipped_count += 1;
                }
            }
        }

        stats.duration_secs = start.elapsed().as_secs_f64();

        tracing::info!(
            "Learn completed: {} sources, {} skipped, {} chunks, {} bytes in {:.2}s",
            stats.sources_count,
            stats.skipped_count,
            stats.chunks_count,
            stats.bytes_processed,
            stats.duration_secs
        );

        Ok(stats)
    }

    /// Top-k chunks most similar to `query`, best first.
    pub async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<ScoredChunk>> {
        let query_embedding = self.embedder.embed_query(query).await?;
        let min_score = self.config.min_score;
        self.with_index(move |conn| index::query_chunks(conn, &query_embedding, top_k, min_score))
            .await
    }

    /// Statistics for this base.
    pub fn stats(&self) -> AppResult<BaseStats> {
        let (sources_count, chunks_count, last_learn_at) = {
            let conn = self.lock()?;
            index::get_stats(&conn)?
        };

        let db_size_bytes = std::fs::metadata(&self.index_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(BaseStats {
            base_name: self.config.name.clone(),
            sources_count,
            chunks_count,
            db_size_bytes,
            last_learn_at,
        })
    }

    /// Delete all sources and chunks.
    pub fn clean(&self) -> AppResult<()> {
        let conn = self.lock()?;
        index::reset_index(&conn)
    }
}

fn lock_index(conn: &Mutex<Connection>) -> AppResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| AppError::Knowledge("Knowledge index lock poisoned".to_string()))
}

/// Check whether a walked file passes the include/exclude patterns.
fn should_include(path: &Path, options: &LearnOptions) -> bool {
    let path_str = path.to_string_lossy();

    if options
        .exclude
        .iter()
        .any(|pattern| path_str.contains(pattern.as_str()))
    {
        return false;
    }

    options.include.is_empty()
        || options
            .include
            .iter()
            .any(|pattern| path_str.contains(pattern.as_str()))
}
