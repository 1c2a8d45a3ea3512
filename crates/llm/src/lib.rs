//! LLM integration crate for Axon.
//!
//! Provides a provider-agnostic abstraction for talking to Large Language
//! Models through a single trait, plus helpers for extracting typed JSON
//! from model replies.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **OpenAI-compatible**: OpenAI, Groq, Gemini's OpenAI endpoint, etc.
//!
//! # Example
//! ```no_run
//! use axon_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("llama3.2").user("Hello, world!");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod structured;

pub use client::{ChatRole, ChatTurn, LlmClient, LlmRequest, LlmResponse, OutputFormat, TokenUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use structured::parse_structured;
