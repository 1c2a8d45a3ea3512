//! Wiring of a production [`AgentService`] from configuration.

use crate::adapters::{KnowledgeBaseLookup, KnowledgeIngest, LlmInference, RoleSettings, TavilySearch};
use crate::machine::RoutingMachine;
use crate::prompts::AgentPrompts;
use crate::service::AgentService;
use crate::session::{MemorySessionStore, SessionStore, SqliteSessionStore};
use axon_core::config::{AppConfig, ProviderConfig, RoleModel, SessionBackend};
use axon_core::AppResult;
use axon_knowledge::KnowledgeBase;
use std::sync::Arc;
use std::time::Duration;

/// Build the agent service: LLM inference, local knowledge base, Tavily
/// search and the configured session store.
pub fn build_service(config: &AppConfig) -> AppResult<AgentService> {
    config.validate()?;
    config.ensure_axon_dir()?;

    let inference = Arc::new(build_inference(config)?);

    let base = Arc::new(KnowledgeBase::open(
        &config.workspace,
        &config.agent.knowledge_base,
    )?);
    let knowledge = Arc::new(KnowledgeBaseLookup::new(
        base.clone(),
        config.agent.top_k as usize,
    ));
    let web = Arc::new(TavilySearch::from_config(&config.search));

    let prompts = AgentPrompts::load(&config.workspace)?;
    let machine = RoutingMachine::new(
        inference,
        knowledge,
        web,
        prompts,
        config.agent.preview_chars,
    );

    let sessions = open_session_store(config)?;

    tracing::info!(
        provider = %config.provider,
        knowledge_base = %config.agent.knowledge_base,
        sessions = ?config.sessions.backend,
        "Agent service ready"
    );

    Ok(AgentService::new(machine, sessions).with_ingest(Arc::new(KnowledgeIngest::new(base))))
}

fn build_inference(config: &AppConfig) -> AppResult<LlmInference> {
    let provider_config = config.get_provider_config(&config.provider);
    let endpoint = provider_config.as_ref().and_then(|p| p.endpoint());
    let timeout = match &provider_config {
        Some(ProviderConfig::Ollama { timeout, .. }) => timeout.map(Duration::from_secs),
        _ => None,
    };
    let api_key = config.resolve_api_key(&config.provider);

    let client = axon_llm::create_client(&config.provider, endpoint, api_key.as_deref(), timeout)?;

    let role = |role: &RoleModel| RoleSettings::new(config.model_for(role), role.temperature);

    Ok(LlmInference::new(
        client,
        role(&config.agent.router),
        role(&config.agent.judge),
        role(&config.agent.answer),
    ))
}

/// Open the session store selected in config.
pub fn open_session_store(config: &AppConfig) -> AppResult<Arc<dyn SessionStore>> {
    Ok(match config.sessions.backend {
        SessionBackend::Memory => Arc::new(MemorySessionStore::new()),
        SessionBackend::Sqlite => Arc::new(SqliteSessionStore::open(&config.sessions_path())?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> AppConfig {
        AppConfig {
            workspace: temp.path().to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_service_with_defaults() {
        let temp = TempDir::new().unwrap();
        assert!(build_service(&config_in(&temp)).is_ok());
        assert!(temp.path().join(".axon/knowledge/default/index.sqlite").exists());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig {
            provider: "carrier-pigeon".to_string(),
            ..config_in(&temp)
        };
        assert!(matches!(build_service(&config), Err(AppError::Config(_))));
    }

    #[test]
    fn test_sqlite_session_backend() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        config.sessions.backend = SessionBackend::Sqlite;

        open_session_store(&config).unwrap();
        assert!(temp.path().join(".axon/sessions.sqlite").exists());
    }
}
