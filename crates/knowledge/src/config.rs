//! On-disk layout and configuration of a knowledge base.
//!
//! ```text
//! .axon/knowledge/<base>/
//!   config.yaml    embedding, chunking and scoring settings
//!   index.sqlite   sources and embedded chunks
//! ```

use crate::types::{EmbeddingSettings, KnowledgeBaseConfig};
use axon_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Paths of one base inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseLayout {
    dir: PathBuf,
}

impl BaseLayout {
    pub fn new(workspace: &Path, base_name: &str) -> Self {
        Self {
            dir: workspace.join(".axon").join("knowledge").join(base_name),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config.yaml")
    }

    pub fn index_path(&self) -> PathBuf {
        self.dir.join("index.sqlite")
    }
}

impl KnowledgeBaseConfig {
    /// Reject settings the chunker or scorer cannot work with.
    pub fn validate(&self) -> AppResult<()> {
        let chunking = &self.chunking;
        if chunking.size == 0 {
            return Err(AppError::Knowledge("chunking.size must be positive".to_string()));
        }
        if chunking.overlap >= chunking.size {
            return Err(AppError::Knowledge(format!(
                "chunking.overlap ({}) must be smaller than chunking.size ({})",
                chunking.overlap, chunking.size
            )));
        }

        let dimensions = match &self.embedding {
            EmbeddingSettings::Trigram { dimensions } => *dimensions,
            EmbeddingSettings::Ollama { dimensions, .. } => *dimensions,
        };
        if dimensions == 0 {
            return Err(AppError::Knowledge(
                "embedding.dimensions must be positive".to_string(),
            ));
        }

        if !(-1.0..=1.0).contains(&self.min_score) {
            return Err(AppError::Knowledge(format!(
                "minScore ({}) must lie in [-1, 1]",
                self.min_score
            )));
        }

        Ok(())
    }
}

/// Read the base's config, writing the defaults on first use.
pub fn load_or_init(layout: &BaseLayout, base_name: &str) -> AppResult<KnowledgeBaseConfig> {
    let config_path = layout.config_path();

    if !config_path.exists() {
        let config = KnowledgeBaseConfig::named(base_name);
        save(layout, &config)?;
        tracing::debug!("Initialized knowledge base config for '{}'", base_name);
        return Ok(config);
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::Knowledge(format!("Failed to read config at {:?}: {}", config_path, e))
    })?;

    let mut config: KnowledgeBaseConfig = serde_yaml::from_str(&content).map_err(|e| {
        AppError::Knowledge(format!("Failed to parse config at {:?}: {}", config_path, e))
    })?;
    config.name = base_name.to_string();
    config.validate()?;

    tracing::debug!("Loaded knowledge base config for '{}'", base_name);
    Ok(config)
}

/// Write `config` to the base directory.
pub fn save(layout: &BaseLayout, config: &KnowledgeBaseConfig) -> AppResult<()> {
    fs::create_dir_all(layout.dir()).map_err(|e| {
        AppError::Knowledge(format!("Failed to create {:?}: {}", layout.dir(), e))
    })?;

    let yaml = serde_yaml::to_string(config)?;
    let config_path = layout.config_path();
    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Knowledge(format!("Failed to write config to {:?}: {}", config_path, e))
    })
}
