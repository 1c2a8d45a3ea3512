//! Serve command handler.
//!
//! Starts the HTTP boundary in front of the agent service.

use crate::api::{create_router, AppState};
use axon_agent::build_service;
use axon_core::{config::AppConfig, AppResult};
use clap::Args;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Serve the agent over HTTP
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let service = build_service(config)?;
        let state = AppState::new(Arc::new(service));

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = create_router(state)
            .layer(TraceLayer::new_for_http())
            .layer(cors);

        let host = self.host.as_deref().unwrap_or(&config.server.host);
        let port = self.port.unwrap_or(config.server.port);
        let addr = format!("{}:{}", host, port);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Axon server listening on {}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
