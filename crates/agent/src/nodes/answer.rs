//! Answer: synthesize the final reply from gathered context.

use crate::machine::{Node, RoutingMachine, StepDetail, StepOutcome, Transition};
use crate::nodes::web::WEB_DISABLED_NOTICE;
use crate::state::ConversationState;
use axon_core::AppResult;

pub const NO_CONTEXT_NOTICE: &str =
    "No external context was available for this query. Try to answer based on general knowledge if possible.";

pub(crate) async fn run(
    machine: &RoutingMachine,
    state: &mut ConversationState,
) -> AppResult<StepOutcome> {
    let query = state.latest_user_turn()?;
    let context = build_context(state.knowledge_text.as_deref(), state.web_text.as_deref());
    let request = machine.prompts.answer_request(query, &context)?;

    let answer = machine.inference.infer_text(&request).await?;
    tracing::info!(chars = answer.chars().count(), "Generated final answer");

    state.push_assistant(answer);

    Ok(StepOutcome {
        node: Node::Answer,
        detail: StepDetail::Answer,
        next: Transition::End,
    })
}

/// Labeled context sections, or the no-context notice when there are none.
pub fn build_context(knowledge_text: Option<&str>, web_text: Option<&str>) -> String {
    let mut sections = Vec::with_capacity(2);

    if let Some(knowledge) = knowledge_text.filter(|t| !t.is_empty()) {
        sections.push(format!("Knowledge Base Information:\n{}", knowledge));
    }

    if let Some(web) = web_text.filter(|t| !t.is_empty() && *t != WEB_DISABLED_NOTICE) {
        sections.push(format!("Web Search Results:\n{}", web));
    }

    let context = sections.join("\n\n");
    if context.trim().is_empty() {
        NO_CONTEXT_NOTICE.to_string()
    } else {
        context
    }
}
