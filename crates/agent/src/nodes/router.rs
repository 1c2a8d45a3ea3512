//! Router: picks the first route for the latest user turn.

use crate::decision::RouteDecision;
use crate::machine::{Node, RoutingMachine, StepDetail, StepOutcome, Transition};
use crate::ports::infer_structured;
use crate::state::{ConversationState, Route, RouteOverride};
use axon_core::AppResult;

pub const WEB_DISABLED_OVERRIDE_REASON: &str = "Web search disabled by user; redirected to RAG.";

pub(crate) async fn run(
    machine: &RoutingMachine,
    state: &mut ConversationState,
) -> AppResult<StepOutcome> {
    let query = state.latest_user_turn()?;
    let request = machine
        .prompts
        .router_request(query, state.web_search_enabled)?;

    let decision: RouteDecision = infer_structured(machine.inference.as_ref(), &request).await?;

    let (route, route_override) = apply_web_guard(decision.route, state.web_search_enabled);
    if let Some(over) = &route_override {
        tracing::warn!(
            initial = %over.initial_decision,
            overridden_to = %route,
            "Router decision overridden: {}",
            over.reason
        );
    }

    state.route = Some(route);
    state.route_override = route_override.clone();

    if route == Route::End {
        state.push_assistant(decision.reply_or_default());
    }

    tracing::info!(route = %route, web_search_enabled = state.web_search_enabled, "Router decided");

    Ok(StepOutcome {
        node: Node::Router,
        detail: StepDetail::Router {
            decision: route,
            route_override,
        },
        next: Transition::for_route(route),
    })
}

/// Force `web` to `rag` when web search is disabled.
pub fn apply_web_guard(route: Route, web_search_enabled: bool) -> (Route, Option<RouteOverride>) {
    if route == Route::Web && !web_search_enabled {
        return (
            Route::Rag,
            Some(RouteOverride {
                initial_decision: Route::Web,
                reason: WEB_DISABLED_OVERRIDE_REASON.to_string(),
            }),
        );
    }
    (route, None)
}
