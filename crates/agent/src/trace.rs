//! Structured trace of a run, one event per transition.

use crate::machine::{Node, StepDetail, StepOutcome, Transition};
use crate::nodes::rag::RagVerdict;
use crate::nodes::web::WebStatus;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Node name of the completion marker appended after the last step.
pub const END_NODE_NAME: &str = "__end__";

/// One recorded transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// 1-indexed position in the run
    pub step: u32,
    pub node_name: String,
    pub description: String,
    pub details: Map<String, Value>,
    pub event_type: String,
}

/// Truncate `text` to `budget` characters, adding "..." only when cut.
pub fn preview(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Turns step outcomes into trace events.
#[derive(Debug)]
pub struct TraceRecorder {
    preview_chars: usize,
    events: Vec<TraceEvent>,
}

impl TraceRecorder {
    pub fn new(preview_chars: usize) -> Self {
        Self {
            preview_chars,
            events: Vec::new(),
        }
    }

    /// Record one executed step.
    pub fn record(&mut self, outcome: &StepOutcome) {
        let (description, details) = self.describe(outcome);
        self.push(outcome.node.name(), outcome.node.event_type(), description, details);
    }

    /// Append the completion marker.
    pub fn finish(&mut self) {
        self.push(
            END_NODE_NAME,
            "process_end",
            "Agent process completed.".to_string(),
            Map::new(),
        );
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    fn push(&mut self, node_name: &str, event_type: &str, description: String, details: Map<String, Value>) {
        let step = self.events.len() as u32 + 1;
        tracing::debug!(step, node = node_name, "{}", description);
        self.events.push(TraceEvent {
            step,
            node_name: node_name.to_string(),
            description,
            details,
            event_type: event_type.to_string(),
        });
    }

    fn describe(&self, outcome: &StepOutcome) -> (String, Map<String, Value>) {
        match &outcome.detail {
            StepDetail::Router {
                decision,
                route_override: Some(over),
            } => (
                format!(
                    "Router initially decided: '{}'. Overridden to: '{}' because {}",
                    over.initial_decision, decision, over.reason
                ),
                details(json!({
                    "initial_decision": over.initial_decision,
                    "final_decision": decision,
                    "override_reason": over.reason,
                })),
            ),
            StepDetail::Router {
                decision,
                route_override: None,
            } => (
                format!("Router decided: '{}'", decision),
                details(json!({
                    "decision": decision,
                    "reason": "Based on initial query analysis.",
                })),
            ),
            StepDetail::Rag { retrieved, verdict } => {
                let onward = match outcome.next {
                    Transition::To(Node::WebSearch) => "Diverting to web search.",
                    _ => "Proceeding to answer.",
                };
                let description = match verdict {
                    RagVerdict::Sufficient => {
                        "RAG Lookup performed. Content found and deemed sufficient. Proceeding to answer."
                            .to_string()
                    }
                    RagVerdict::NotSufficient => {
                        format!("RAG Lookup performed. Content NOT sufficient. {}", onward)
                    }
                    RagVerdict::LookupFailed => format!("RAG Lookup failed. {}", onward),
                };
                (
                    description,
                    details(json!({
                        "retrieved_content_summary": preview(retrieved, self.preview_chars),
                        "sufficiency_verdict": verdict.label(),
                    })),
                )
            }
            StepDetail::Web { retrieved, status } => {
                let description = match status {
                    WebStatus::Retrieved => {
                        "Web Search performed. Results retrieved. Proceeding to answer."
                    }
                    WebStatus::Failed => {
                        "Web Search failed. Proceeding to answer with limited information."
                    }
                    WebStatus::Disabled => {
                        "Web Search skipped because it is disabled. Proceeding to answer."
                    }
                };
                (
                    description.to_string(),
                    details(json!({
                        "retrieved_content_summary": preview(retrieved, self.preview_chars),
                    })),
                )
            }
            StepDetail::Answer => (
                "Generating final answer using gathered context.".to_string(),
                Map::new(),
            ),
        }
    }
}

fn details(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
