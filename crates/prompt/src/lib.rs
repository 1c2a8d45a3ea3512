//! Prompt system for Axon.
//!
//! - YAML prompt definitions, built in and overridable per workspace
//! - Handlebars template rendering for system and user messages

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

pub use builder::build_prompt;
pub use builtin::{ANSWER_PROMPT_ID, JUDGE_PROMPT_ID, ROUTER_PROMPT_ID};
pub use loader::load_prompt;
pub use types::{BuiltPrompt, OutputKind, PromptDefinition};
