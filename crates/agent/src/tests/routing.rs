use super::fakes::{Harness, RecordingLookup, ScriptedInference};
use crate::nodes::answer::NO_CONTEXT_NOTICE;
use crate::nodes::router::WEB_DISABLED_OVERRIDE_REASON;
use crate::nodes::web::WEB_DISABLED_NOTICE;
use crate::ports::InferenceRole;
use crate::state::{ConversationState, Role, Route};
use crate::trace::{TraceEvent, END_NODE_NAME};
use axon_core::AppError;

const POLICY_QUERY: &str = "What is our expense policy?";
const POLICY_TEXT: &str = "Expenses over $50 need a receipt and manager approval.";

fn turn(query: &str, web: bool) -> ConversationState {
    let mut state = ConversationState::default();
    state.begin_turn(query, web);
    state
}

fn node_names(events: &[TraceEvent]) -> Vec<&str> {
    events.iter().map(|e| e.node_name.as_str()).collect()
}

fn assert_steps_sequential(events: &[TraceEvent]) {
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.step as usize, i + 1);
    }
}

#[tokio::test]
async fn test_greeting_ends_at_router() {
    let h = Harness::new(
        ScriptedInference::new().route_end(Some("Hello! How can I assist you today?")),
        RecordingLookup::found(POLICY_TEXT),
        RecordingLookup::found("web"),
    );
    let mut state = turn("Hi", true);

    let events = h.machine.run(&mut state).await.unwrap();

    assert_eq!(node_names(&events), vec!["router", END_NODE_NAME]);
    assert_eq!(state.route, Some(Route::End));
    assert_eq!(state.messages.len(), 2);
    assert_eq!(
        state.latest_assistant_turn(),
        Some("Hello! How can I assist you today?")
    );
    assert_eq!(h.knowledge.call_count(), 0);
    assert_eq!(h.web.call_count(), 0);
    assert!(h.inference.calls_for(InferenceRole::Answer).is_empty());
}

#[tokio::test]
async fn test_greeting_without_reply_uses_fallback() {
    let h = Harness::new(
        ScriptedInference::new().route_end(None),
        RecordingLookup::found(""),
        RecordingLookup::found(""),
    );
    let mut state = turn("Hey", true);

    h.machine.run(&mut state).await.unwrap();

    assert_eq!(state.latest_assistant_turn(), Some("Hello!"));
}

#[tokio::test]
async fn test_sufficient_knowledge_goes_straight_to_answer() {
    let h = Harness::new(
        ScriptedInference::new()
            .route("rag")
            .verdict(true)
            .answer("Receipts are required above $50."),
        RecordingLookup::found(POLICY_TEXT),
        RecordingLookup::found("web results"),
    );
    let mut state = turn(POLICY_QUERY, true);

    let events = h.machine.run(&mut state).await.unwrap();

    assert_eq!(
        node_names(&events),
        vec!["router", "rag_lookup", "answer", END_NODE_NAME]
    );
    assert_steps_sequential(&events);
    assert_eq!(events[1].details["sufficiency_verdict"], "Sufficient");
    assert_eq!(h.web.call_count(), 0);

    let prompt = h.answer_prompt();
    assert!(prompt.contains(&format!("Knowledge Base Information:\n{}", POLICY_TEXT)));
    assert!(!prompt.contains("Web Search Results:"));
    assert_eq!(
        state.latest_assistant_turn(),
        Some("Receipts are required above $50.")
    );
}

#[tokio::test]
async fn test_insufficient_knowledge_falls_back_to_web() {
    let h = Harness::new(
        ScriptedInference::new()
            .route("rag")
            .verdict(false)
            .answer("Combined answer."),
        RecordingLookup::found("Expenses are a thing."),
        RecordingLookup::found("Title: Policy\nContent: Receipts needed\nURL: https://x"),
    );
    let mut state = turn(POLICY_QUERY, true);

    let events = h.machine.run(&mut state).await.unwrap();

    assert_eq!(
        node_names(&events),
        vec!["router", "rag_lookup", "web_search", "answer", END_NODE_NAME]
    );
    assert_steps_sequential(&events);
    assert_eq!(events[1].details["sufficiency_verdict"], "Not Sufficient");
    assert_eq!(events[2].event_type, "web_action");
    assert_eq!(*h.web.queries.lock().unwrap(), vec![POLICY_QUERY.to_string()]);

    let prompt = h.answer_prompt();
    let kb_at = prompt.find("Knowledge Base Information:").unwrap();
    let web_at = prompt.find("Web Search Results:").unwrap();
    assert!(kb_at < web_at);
}

#[tokio::test]
async fn test_insufficient_knowledge_with_web_disabled_answers_directly() {
    let h = Harness::new(
        ScriptedInference::new()
            .route("rag")
            .verdict(false)
            .answer("Best effort."),
        RecordingLookup::found("Expenses are a thing."),
        RecordingLookup::found("should never be used"),
    );
    let mut state = turn(POLICY_QUERY, false);

    let events = h.machine.run(&mut state).await.unwrap();

    assert_eq!(
        node_names(&events),
        vec!["router", "rag_lookup", "answer", END_NODE_NAME]
    );
    assert_eq!(h.web.call_count(), 0);
    assert!(h
        .answer_prompt()
        .contains("Knowledge Base Information:\nExpenses are a thing."));
}

#[tokio::test]
async fn test_empty_knowledge_with_web_disabled_uses_no_context_notice() {
    let h = Harness::new(
        ScriptedInference::new()
            .route("rag")
            .verdict(false)
            .answer("General answer."),
        RecordingLookup::found(""),
        RecordingLookup::found("unused"),
    );
    let mut state = turn(POLICY_QUERY, false);

    h.machine.run(&mut state).await.unwrap();

    // Empty retrieval is still judged.
    assert_eq!(h.inference.calls_for(InferenceRole::Judge).len(), 1);
    assert!(h.answer_prompt().contains(NO_CONTEXT_NOTICE));
    assert_eq!(h.web.call_count(), 0);
}

#[tokio::test]
async fn test_router_web_choice_is_overridden_when_disabled() {
    let h = Harness::new(
        ScriptedInference::new()
            .route("web")
            .verdict(true)
            .answer("From the knowledge base."),
        RecordingLookup::found(POLICY_TEXT),
        RecordingLookup::found("live results"),
    );
    let mut state = turn("Who won the match last night?", false);

    let events = h.machine.run(&mut state).await.unwrap();

    let over = state.route_override.clone().unwrap();
    assert_eq!(over.initial_decision, Route::Web);
    assert_eq!(over.reason, WEB_DISABLED_OVERRIDE_REASON);
    assert_eq!(events[0].details["initial_decision"], "web");
    assert_eq!(events[0].details["final_decision"], "rag");
    assert_eq!(events[0].details["override_reason"], WEB_DISABLED_OVERRIDE_REASON);
    assert_eq!(events[1].node_name, "rag_lookup");
    assert_eq!(h.web.call_count(), 0);
}

#[tokio::test]
async fn test_router_prompt_reflects_web_flag() {
    let h = Harness::new(
        ScriptedInference::new().route("answer").answer("42"),
        RecordingLookup::found(""),
        RecordingLookup::found(""),
    );
    let mut state = turn("What is 6 times 7?", false);
    h.machine.run(&mut state).await.unwrap();

    let router_call = h.inference.calls_for(InferenceRole::Router).remove(0);
    assert_eq!(router_call.user, "What is 6 times 7?");
    assert!(router_call
        .system
        .unwrap()
        .contains("You MUST NOT choose the \"web\" route"));
}

#[tokio::test]
async fn test_direct_answer_route() {
    let h = Harness::new(
        ScriptedInference::new().route("answer").answer("I am Axon."),
        RecordingLookup::found(POLICY_TEXT),
        RecordingLookup::found("web"),
    );
    let mut state = turn("What is your name?", true);

    let events = h.machine.run(&mut state).await.unwrap();

    assert_eq!(node_names(&events), vec!["router", "answer", END_NODE_NAME]);
    assert_eq!(h.knowledge.call_count(), 0);
    assert!(h.answer_prompt().contains(NO_CONTEXT_NOTICE));
}

#[tokio::test]
async fn test_both_lookups_failing_still_yields_one_answer() {
    let h = Harness::new(
        ScriptedInference::new()
            .route("rag")
            .answer("Answer from general knowledge."),
        RecordingLookup::failed("index unavailable"),
        RecordingLookup::failed("search quota exceeded"),
    );
    let mut state = turn(POLICY_QUERY, true);

    let events = h.machine.run(&mut state).await.unwrap();

    assert_eq!(
        node_names(&events),
        vec!["router", "rag_lookup", "web_search", "answer", END_NODE_NAME]
    );
    assert_eq!(events[1].details["sufficiency_verdict"], "Lookup Failed");
    assert_eq!(events[1].details["retrieved_content_summary"], "");
    assert!(h.inference.calls_for(InferenceRole::Judge).is_empty());
    assert_eq!(state.knowledge_text.as_deref(), Some(""));
    assert_eq!(state.web_text.as_deref(), Some(""));
    assert!(state.route_override.is_none());
    assert!(h.answer_prompt().contains(NO_CONTEXT_NOTICE));

    let assistant_turns = state
        .messages
        .iter()
        .filter(|m| m.role == Role::Assistant)
        .count();
    assert_eq!(assistant_turns, 1);
}

#[tokio::test]
async fn test_knowledge_failure_with_web_disabled_goes_to_answer() {
    let h = Harness::new(
        ScriptedInference::new().route("rag").answer("ok"),
        RecordingLookup::failed("boom"),
        RecordingLookup::found("unused"),
    );
    let mut state = turn(POLICY_QUERY, false);

    let events = h.machine.run(&mut state).await.unwrap();

    assert_eq!(
        node_names(&events),
        vec!["router", "rag_lookup", "answer", END_NODE_NAME]
    );
    assert!(events[1].description.ends_with("Proceeding to answer."));
    assert_eq!(h.web.call_count(), 0);
}

#[tokio::test]
async fn test_web_step_never_searches_when_disabled() {
    // A mis-routed state reaching the web step with web search off.
    let h = Harness::new(
        ScriptedInference::new().answer("ok"),
        RecordingLookup::found(""),
        RecordingLookup::found("live"),
    );
    let mut state = turn("news", false);

    let outcome = crate::nodes::web::run(&h.machine, &mut state).await.unwrap();

    assert_eq!(h.web.call_count(), 0);
    assert_eq!(state.web_text.as_deref(), Some(WEB_DISABLED_NOTICE));
    assert_eq!(state.route, Some(Route::Answer));
    assert_eq!(
        outcome.next,
        crate::machine::Transition::To(crate::machine::Node::Answer)
    );
}

#[tokio::test]
async fn test_web_route_when_enabled() {
    let snippets = "Title: Final\nContent: Team A won 3-1\nURL: https://sports.example";
    let h = Harness::new(
        ScriptedInference::new().route("web").answer("Team A won."),
        RecordingLookup::found(POLICY_TEXT),
        RecordingLookup::found(snippets),
    );
    let mut state = turn("Who won the NBA finals last night?", true);

    let events = h.machine.run(&mut state).await.unwrap();

    assert_eq!(
        node_names(&events),
        vec!["router", "web_search", "answer", END_NODE_NAME]
    );
    assert_eq!(h.knowledge.call_count(), 0);
    assert!(h
        .answer_prompt()
        .contains(&format!("Web Search Results:\n{}", snippets)));
}

#[tokio::test]
async fn test_long_retrieval_is_previewed_in_trace() {
    let long_text = "a".repeat(450);
    let h = Harness::new(
        ScriptedInference::new().route("rag").verdict(true).answer("ok"),
        RecordingLookup::found(&long_text),
        RecordingLookup::found(""),
    );
    let mut state = turn(POLICY_QUERY, true);

    let events = h.machine.run(&mut state).await.unwrap();

    let summary = events[1].details["retrieved_content_summary"].as_str().unwrap();
    assert_eq!(summary, format!("{}...", "a".repeat(200)));
    assert_eq!(state.knowledge_text.as_deref(), Some(long_text.as_str()));
}

#[tokio::test]
async fn test_malformed_verdict_is_fatal() {
    let h = Harness::new(
        ScriptedInference::new()
            .route("rag")
            .judge_json(serde_json::json!({ "sufficient": "maybe" })),
        RecordingLookup::found(POLICY_TEXT),
        RecordingLookup::found("web"),
    );
    let mut state = turn(POLICY_QUERY, true);

    let result = h.machine.run(&mut state).await;

    assert!(matches!(result, Err(AppError::Inference(_))));
    assert_eq!(h.web.call_count(), 0);
    assert!(state.latest_assistant_turn().is_none());
}

#[tokio::test]
async fn test_unknown_route_is_fatal() {
    let h = Harness::new(
        ScriptedInference::new().router_json(serde_json::json!({ "route": "telepathy" })),
        RecordingLookup::found(""),
        RecordingLookup::found(""),
    );
    let mut state = turn("?", true);

    assert!(matches!(
        h.machine.run(&mut state).await,
        Err(AppError::Inference(_))
    ));
}

#[tokio::test]
async fn test_router_failure_propagates() {
    let h = Harness::new(
        ScriptedInference::new().router_error("provider down"),
        RecordingLookup::found(""),
        RecordingLookup::found(""),
    );
    let mut state = turn("question", true);

    assert!(matches!(
        h.machine.run(&mut state).await,
        Err(AppError::Inference(_))
    ));
}

#[tokio::test]
async fn test_empty_history_has_no_user_turn() {
    let h = Harness::new(
        ScriptedInference::new().route("answer"),
        RecordingLookup::found(""),
        RecordingLookup::found(""),
    );
    let mut state = ConversationState::default();

    assert!(matches!(
        h.machine.run(&mut state).await,
        Err(AppError::NoUserTurnFound)
    ));
    assert!(h.inference.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_disabled_web_never_reaches_live_lookup_for_any_router_output() {
    for route in ["rag", "web", "answer", "end"] {
        for sufficient in [true, false] {
            let h = Harness::new(
                ScriptedInference::new()
                    .route(route)
                    .verdict(sufficient)
                    .answer("ok"),
                RecordingLookup::found("some knowledge"),
                RecordingLookup::found("live"),
            );
            let mut state = turn("anything", false);

            let events = h.machine.run(&mut state).await.unwrap();

            assert_eq!(h.web.call_count(), 0, "route {} sufficient {}", route, sufficient);
            assert!(matches!(
                state.route,
                Some(Route::Rag | Route::Answer | Route::End)
            ));
            assert_steps_sequential(&events);
            assert_eq!(events.last().unwrap().node_name, END_NODE_NAME);
        }
    }
}
