//! Knowledge command handler.
//!
//! Handles local RAG knowledge base management.

use axon_core::{config::AppConfig, AppResult};
use axon_knowledge::{KnowledgeBase, LearnOptions};
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Knowledge base management (local RAG)
#[derive(Args, Debug)]
pub struct KnowledgeCommand {
    /// Knowledge base name (default: the agent's configured base)
    #[arg(short, long, global = true)]
    pub base: Option<String>,

    #[command(subcommand)]
    pub action: KnowledgeAction,
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeAction {
    /// Learn from local files and directories
    Learn(KnowledgeLearnCommand),
    /// Show knowledge base statistics
    Stats(KnowledgeStatsCommand),
    /// Delete everything the base has learned
    Clean,
}

/// Learn from sources
#[derive(Args, Debug)]
pub struct KnowledgeLearnCommand {
    /// Files or directories to learn from (PDF, Markdown, text)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Only learn files whose path contains one of these patterns
    #[arg(long)]
    pub include: Vec<String>,

    /// Skip files whose path contains one of these patterns
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Reset base before learning
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show knowledge base stats
#[derive(Args, Debug)]
pub struct KnowledgeStatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let name = self
            .base
            .clone()
            .unwrap_or_else(|| config.agent.knowledge_base.clone());
        let base = KnowledgeBase::open(&config.workspace, &name)?;

        match &self.action {
            KnowledgeAction::Learn(cmd) => cmd.execute(&base).await,
            KnowledgeAction::Stats(cmd) => cmd.execute(&base),
            KnowledgeAction::Clean => {
                tracing::info!("Cleaning knowledge base '{}'", base.name());
                base.clean()?;
                println!("Knowledge base '{}' cleaned", base.name());
                Ok(())
            }
        }
    }
}

impl KnowledgeLearnCommand {
    pub async fn execute(&self, base: &KnowledgeBase) -> AppResult<()> {
        tracing::info!("Executing knowledge learn command for base '{}'", base.name());

        let options = LearnOptions {
            paths: self.paths.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            reset: self.reset,
        };

        let stats = base.learn(&options).await?;

        if self.json {
            let output = serde_json::json!({
                "base": base.name(),
                "sourcesCount": stats.sources_count,
                "skippedCount": stats.skipped_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Learned {} sources ({} chunks, {} bytes) in {:.2}s",
                stats.sources_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            );
            if stats.skipped_count > 0 {
                println!("Skipped {} files that could not be read", stats.skipped_count);
            }
        }

        Ok(())
    }
}

impl KnowledgeStatsCommand {
    pub fn execute(&self, base: &KnowledgeBase) -> AppResult<()> {
        let stats = base.stats()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("Knowledge base: {}", stats.base_name);
        println!("Sources:        {}", stats.sources_count);
        println!("Chunks:         {}", stats.chunks_count);
        println!("Index size:     {} bytes", stats.db_size_bytes);
        match stats.last_learn_at {
            Some(at) => println!("Last learned:   {}", at.to_rfc3339()),
            None => println!("Last learned:   never"),
        }

        Ok(())
    }
}
