//! Inference over an [`LlmClient`], with a model and temperature per role.

use crate::ports::{InferencePort, InferenceRequest, InferenceRole};
use axon_core::AppResult;
use axon_llm::{parse_structured, LlmClient, LlmRequest, OutputFormat};
use std::sync::Arc;

/// Model and sampling temperature for one role.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleSettings {
    pub model: String,
    pub temperature: f32,
}

impl RoleSettings {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
        }
    }
}

/// [`InferencePort`] backed by an LLM provider.
pub struct LlmInference {
    client: Arc<dyn LlmClient>,
    router: RoleSettings,
    judge: RoleSettings,
    answer: RoleSettings,
}

impl LlmInference {
    pub fn new(
        client: Arc<dyn LlmClient>,
        router: RoleSettings,
        judge: RoleSettings,
        answer: RoleSettings,
    ) -> Self {
        Self {
            client,
            router,
            judge,
            answer,
        }
    }

    fn settings(&self, role: InferenceRole) -> &RoleSettings {
        match role {
            InferenceRole::Router => &self.router,
            InferenceRole::Judge => &self.judge,
            InferenceRole::Answer => &self.answer,
        }
    }

    fn to_llm_request(&self, request: &InferenceRequest, format: OutputFormat) -> LlmRequest {
        let settings = self.settings(request.role);
        let mut llm_request = LlmRequest::new(settings.model.clone()).temperature(settings.temperature);
        if let Some(system) = &request.system {
            llm_request = llm_request.system(system.clone());
        }
        llm_request = llm_request.user(request.user.clone());
        match format {
            OutputFormat::Json => llm_request.json(),
            OutputFormat::Text => llm_request,
        }
    }

    async fn complete(&self, request: &InferenceRequest, format: OutputFormat) -> AppResult<String> {
        let llm_request = self.to_llm_request(request, format);
        tracing::debug!(
            role = %request.role,
            provider = self.client.provider_name(),
            model = %llm_request.model,
            ?format,
            "Inference request"
        );

        let response = self.client.complete(&llm_request).await?;
        if let Some(usage) = response.usage {
            tracing::debug!(
                role = %request.role,
                model = %response.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Inference completed"
            );
        }
        Ok(response.content)
    }
}

#[async_trait::async_trait]
impl InferencePort for LlmInference {
    async fn infer_json(&self, request: &InferenceRequest) -> AppResult<serde_json::Value> {
        let content = self.complete(request, OutputFormat::Json).await?;
        parse_structured(&content)
    }

    async fn infer_text(&self, request: &InferenceRequest) -> AppResult<String> {
        let content = self.complete(request, OutputFormat::Text).await?;
        Ok(content.trim().to_string())
    }
}
