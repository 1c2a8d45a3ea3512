//! Port implementations over real collaborators.

pub mod ingest;
pub mod knowledge;
pub mod llm;
pub mod web;

pub use ingest::KnowledgeIngest;
pub use knowledge::KnowledgeBaseLookup;
pub use llm::{LlmInference, RoleSettings};
pub use web::TavilySearch;
