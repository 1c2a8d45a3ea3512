//! The routing state machine.
//!
//! ```text
//! Router ──rag──▶ RagLookup ──insufficient, web on──▶ WebSearch ──▶ Answer ──▶ End
//!   │                 └──sufficient / web off / failed──────────────▶ Answer
//!   ├──web──▶ WebSearch
//!   ├──answer──▶ Answer
//!   └──end──▶ End
//! ```
//!
//! Each node mutates the conversation state and returns the next
//! [`Transition`]. Steps run strictly one after another; only inference and
//! lookup calls suspend.

use crate::nodes::{self, rag::RagVerdict, web::WebStatus};
use crate::ports::{InferencePort, KnowledgeLookup, WebLookup};
use crate::prompts::AgentPrompts;
use crate::state::{ConversationState, Route, RouteOverride};
use crate::trace::{TraceEvent, TraceRecorder};
use axon_core::AppResult;
use std::sync::Arc;

/// A state of the machine that runs a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Router,
    RagLookup,
    WebSearch,
    Answer,
}

impl Node {
    /// Name used in trace events.
    pub fn name(&self) -> &'static str {
        match self {
            Node::Router => "router",
            Node::RagLookup => "rag_lookup",
            Node::WebSearch => "web_search",
            Node::Answer => "answer",
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Node::Router => "router_decision",
            Node::RagLookup => "rag_action",
            Node::WebSearch => "web_action",
            Node::Answer => "answer_generation",
        }
    }
}

/// Where the machine goes after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    To(Node),
    End,
}

impl Transition {
    /// Edge followed for a route chosen by a step.
    pub fn for_route(route: Route) -> Self {
        match route {
            Route::Rag => Transition::To(Node::RagLookup),
            Route::Web => Transition::To(Node::WebSearch),
            Route::Answer => Transition::To(Node::Answer),
            Route::End => Transition::End,
        }
    }
}

/// What a step did, for the trace.
#[derive(Debug, Clone, PartialEq)]
pub enum StepDetail {
    Router {
        decision: Route,
        route_override: Option<RouteOverride>,
    },
    Rag {
        retrieved: String,
        verdict: RagVerdict,
    },
    Web {
        retrieved: String,
        status: WebStatus,
    },
    Answer,
}

/// Result of one executed step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub node: Node,
    pub detail: StepDetail,
    pub next: Transition,
}

/// Ports and prompts shared by every node.
pub struct RoutingMachine {
    pub(crate) inference: Arc<dyn InferencePort>,
    pub(crate) knowledge: Arc<dyn KnowledgeLookup>,
    pub(crate) web: Arc<dyn WebLookup>,
    pub(crate) prompts: AgentPrompts,
    preview_chars: usize,
}

impl RoutingMachine {
    pub fn new(
        inference: Arc<dyn InferencePort>,
        knowledge: Arc<dyn KnowledgeLookup>,
        web: Arc<dyn WebLookup>,
        prompts: AgentPrompts,
        preview_chars: usize,
    ) -> Self {
        Self {
            inference,
            knowledge,
            web,
            prompts,
            preview_chars,
        }
    }

    pub(crate) fn preview_chars(&self) -> usize {
        self.preview_chars
    }

    /// Run the machine from `Router` until it ends.
    ///
    /// The state is mutated in place; on error it keeps whatever the
    /// failing step had written so far.
    pub async fn run(&self, state: &mut ConversationState) -> AppResult<Vec<TraceEvent>> {
        let mut recorder = TraceRecorder::new(self.preview_chars);
        let mut node = Node::Router;

        loop {
            tracing::debug!(node = node.name(), "Entering node");
            let outcome = self.step(node, state).await?;
            recorder.record(&outcome);

            match outcome.next {
                Transition::To(next) => node = next,
                Transition::End => break,
            }
        }

        recorder.finish();
        Ok(recorder.into_events())
    }

    async fn step(&self, node: Node, state: &mut ConversationState) -> AppResult<StepOutcome> {
        match node {
            Node::Router => nodes::router::run(self, state).await,
            Node::RagLookup => nodes::rag::run(self, state).await,
            Node::WebSearch => nodes::web::run(self, state).await,
            Node::Answer => nodes::answer::run(self, state).await,
        }
    }
}
