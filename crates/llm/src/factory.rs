//! Provider selection by name.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use axon_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Build the client for `provider` ("ollama" or "openai").
///
/// `endpoint` overrides the provider's default base URL. The OpenAI-compatible
/// provider needs `api_key`; `timeout` applies to Ollama only.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            match timeout {
                Some(timeout) => Arc::new(OllamaClient::with_timeout(base_url, timeout)?),
                None => Arc::new(OllamaClient::with_base_url(base_url)),
            }
        }
        "openai" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            match endpoint {
                Some(base_url) => Arc::new(OpenAiClient::with_base_url(base_url, key)),
                None => Arc::new(OpenAiClient::new(key)),
            }
        }
        other => return Err(AppError::Config(format!("Unknown provider: {}", other))),
    };

    tracing::debug!(provider = client.provider_name(), "Created LLM client");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client(
            "ollama",
            Some("http://localhost:8080"),
            None,
            Some(Duration::from_secs(30)),
        );
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_openai_compatible_client() {
        let client = create_client(
            "openai",
            Some("https://api.groq.com/openai/v1"),
            Some("gsk-test"),
            None,
        )
        .unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("requires API key")),
            _ => panic!("Expected config error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown provider")),
            _ => panic!("Expected config error for unknown provider"),
        }
    }
}
