//! Ask command handler.
//!
//! Runs a single query through the routing agent and prints the answer.

use axon_agent::build_service;
use axon_core::{config::AppConfig, AppResult};
use clap::Args;

/// Ask the agent a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Session to continue (history persists only with the sqlite session backend)
    #[arg(short, long, default_value = "cli")]
    pub session: String,

    /// Never consult web search for this query
    #[arg(long)]
    pub no_web: bool,

    /// Print the answer and trace as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the trace after the answer
    #[arg(long)]
    pub trace: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command for session '{}'", self.session);

        let service = build_service(config)?;
        let response = service
            .execute(&self.session, &self.query, !self.no_web)
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        println!("{}", response.response);

        if self.trace {
            println!();
            println!("Trace:");
            for event in &response.trace_events {
                println!("  {}. [{}] {}", event.step, event.node_name, event.description);
            }
        }

        Ok(())
    }
}
