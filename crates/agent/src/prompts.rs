//! Prompt definitions used by the routing machine.

use crate::ports::{InferenceRequest, InferenceRole};
use axon_core::{AppError, AppResult};
use axon_prompt::{build_prompt, load_prompt, OutputKind, PromptDefinition};
use axon_prompt::{ANSWER_PROMPT_ID, JUDGE_PROMPT_ID, ROUTER_PROMPT_ID};
use serde_json::json;
use std::path::Path;

/// Router, judge and answer prompts, resolved once per service.
#[derive(Debug, Clone)]
pub struct AgentPrompts {
    router: PromptDefinition,
    judge: PromptDefinition,
    answer: PromptDefinition,
}

impl AgentPrompts {
    /// Load prompts, preferring overrides under `<workspace>/.axon/prompts/`.
    ///
    /// Router and judge prompts must declare JSON output.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        Ok(Self {
            router: expect_output(load_prompt(workspace, ROUTER_PROMPT_ID)?, OutputKind::Json)?,
            judge: expect_output(load_prompt(workspace, JUDGE_PROMPT_ID)?, OutputKind::Json)?,
            answer: load_prompt(workspace, ANSWER_PROMPT_ID)?,
        })
    }

    pub fn router_request(&self, query: &str, web_search_enabled: bool) -> AppResult<InferenceRequest> {
        let vars = json!({ "query": query, "web_search_enabled": web_search_enabled });
        render(InferenceRole::Router, &self.router, &vars)
    }

    pub fn judge_request(&self, query: &str, retrieved: &str) -> AppResult<InferenceRequest> {
        let vars = json!({ "query": query, "retrieved": retrieved });
        render(InferenceRole::Judge, &self.judge, &vars)
    }

    pub fn answer_request(&self, query: &str, context: &str) -> AppResult<InferenceRequest> {
        let vars = json!({ "query": query, "context": context });
        render(InferenceRole::Answer, &self.answer, &vars)
    }
}

fn expect_output(definition: PromptDefinition, output: OutputKind) -> AppResult<PromptDefinition> {
    if definition.output != output {
        return Err(AppError::Prompt(format!(
            "Prompt {} must declare {:?} output, found {:?}",
            definition.id, output, definition.output
        )));
    }
    Ok(definition)
}

fn render(
    role: InferenceRole,
    definition: &PromptDefinition,
    vars: &serde_json::Value,
) -> AppResult<InferenceRequest> {
    let built = build_prompt(definition, vars)?;
    Ok(InferenceRequest {
        role,
        system: built.system,
        user: built.user,
    })
}
