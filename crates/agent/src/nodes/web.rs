//! Web search: fetch live snippets, unless web search is disabled.

use crate::machine::{Node, RoutingMachine, StepDetail, StepOutcome, Transition};
use crate::ports::LookupOutcome;
use crate::state::{ConversationState, Route};
use axon_core::AppResult;

/// Placeholder stored as web text when the step runs with web search off.
pub const WEB_DISABLED_NOTICE: &str = "Web search was disabled by the user.";

/// What the web step did, as shown in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebStatus {
    Retrieved,
    Failed,
    Disabled,
}

pub(crate) async fn run(
    machine: &RoutingMachine,
    state: &mut ConversationState,
) -> AppResult<StepOutcome> {
    let query = state.latest_user_turn()?.to_string();

    let (web_text, status) = if !state.web_search_enabled {
        tracing::warn!("Web search step reached with web search disabled; skipping lookup");
        (WEB_DISABLED_NOTICE.to_string(), WebStatus::Disabled)
    } else {
        match machine.web.lookup(&query).await {
            LookupOutcome::Found(snippets) => {
                tracing::info!(bytes = snippets.len(), "Web search returned results");
                (snippets, WebStatus::Retrieved)
            }
            LookupOutcome::Failed(reason) => {
                tracing::warn!("Web search failed: {}", reason);
                (String::new(), WebStatus::Failed)
            }
        }
    };

    state.web_text = Some(web_text.clone());
    state.route = Some(Route::Answer);

    Ok(StepOutcome {
        node: Node::WebSearch,
        detail: StepDetail::Web {
            retrieved: web_text,
            status,
        },
        next: Transition::To(Node::Answer),
    })
}
