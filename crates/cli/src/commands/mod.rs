//! Command handlers for the axon CLI.

pub mod ask;
pub mod knowledge;
pub mod serve;

pub use ask::AskCommand;
pub use knowledge::KnowledgeCommand;
pub use serve::ServeCommand;
