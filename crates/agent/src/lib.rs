//! Query routing agent.
//!
//! Answers a query by routing it between an internal knowledge base, live
//! web search and the model's own knowledge, then synthesizing a reply.
//!
//! - [`machine`]: the routing state machine and its node handlers
//! - [`trace`]: one structured event per transition
//! - [`session`]: per-session persistence and serialization
//! - [`service`]: the `execute` / `upload_document` facade
//! - [`adapters`]: ports over LLM providers, the knowledge base and Tavily

pub mod adapters;
pub mod bootstrap;
pub mod decision;
pub mod machine;
pub mod nodes;
pub mod ports;
pub mod prompts;
pub mod schema;
pub mod service;
pub mod session;
pub mod state;
pub mod trace;

#[cfg(test)]
mod tests;

pub use bootstrap::build_service;
pub use decision::{RouteDecision, SufficiencyVerdict};
pub use machine::RoutingMachine;
pub use ports::{InferencePort, InferenceRequest, InferenceRole, KnowledgeLookup, LookupOutcome, WebLookup};
pub use schema::{AgentResponse, QueryRequest, UploadResponse};
pub use service::{AgentService, DocumentIngest, IngestedDocument};
pub use session::{MemorySessionStore, SessionStore, SqliteSessionStore};
pub use state::{ConversationState, Message, Role, Route, RouteOverride};
pub use trace::TraceEvent;
