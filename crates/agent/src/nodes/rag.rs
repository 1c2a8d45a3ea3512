//! RAG lookup: retrieve internal knowledge and judge its sufficiency.

use crate::decision::SufficiencyVerdict;
use crate::machine::{Node, RoutingMachine, StepDetail, StepOutcome, Transition};
use crate::ports::{infer_structured, LookupOutcome};
use crate::state::{ConversationState, Route};
use axon_core::AppResult;

/// Judgement on retrieved knowledge, as shown in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RagVerdict {
    Sufficient,
    NotSufficient,
    LookupFailed,
}

impl RagVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            RagVerdict::Sufficient => "Sufficient",
            RagVerdict::NotSufficient => "Not Sufficient",
            RagVerdict::LookupFailed => "Lookup Failed",
        }
    }
}

pub(crate) async fn run(
    machine: &RoutingMachine,
    state: &mut ConversationState,
) -> AppResult<StepOutcome> {
    let query = state.latest_user_turn()?.to_string();
    let fallback = if state.web_search_enabled {
        Route::Web
    } else {
        Route::Answer
    };

    let retrieved = match machine.knowledge.lookup(&query).await {
        LookupOutcome::Found(text) => text,
        LookupOutcome::Failed(reason) => {
            tracing::warn!(next = %fallback, "Knowledge lookup failed: {}", reason);
            state.knowledge_text = Some(String::new());
            state.route = Some(fallback);
            return Ok(StepOutcome {
                node: Node::RagLookup,
                detail: StepDetail::Rag {
                    retrieved: String::new(),
                    verdict: RagVerdict::LookupFailed,
                },
                next: Transition::for_route(fallback),
            });
        }
    };

    if retrieved.is_empty() {
        tracing::info!("No knowledge chunks retrieved");
    } else {
        tracing::debug!(
            bytes = retrieved.len(),
            preview = %crate::trace::preview(&retrieved, machine.preview_chars()),
            "Retrieved knowledge"
        );
    }

    let request = machine.prompts.judge_request(&query, &retrieved)?;
    let verdict: SufficiencyVerdict =
        infer_structured(machine.inference.as_ref(), &request).await?;

    let (route, rag_verdict) = if verdict.sufficient {
        (Route::Answer, RagVerdict::Sufficient)
    } else {
        (fallback, RagVerdict::NotSufficient)
    };

    tracing::info!(sufficient = verdict.sufficient, next = %route, "Judged retrieved knowledge");

    state.knowledge_text = Some(retrieved.clone());
    state.route = Some(route);

    Ok(StepOutcome {
        node: Node::RagLookup,
        detail: StepDetail::Rag {
            retrieved,
            verdict: rag_verdict,
        },
        next: Transition::for_route(route),
    })
}
