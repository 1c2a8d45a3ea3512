//! Conversation state owned by one session's run.

use axon_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One role-tagged turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Next information source for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Rag,
    Web,
    Answer,
    End,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Rag => "rag",
            Route::Web => "web",
            Route::Answer => "answer",
            Route::End => "end",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of the router's first choice being forcibly replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOverride {
    pub initial_decision: Route,
    pub reason: String,
}

/// Mutable state of one conversation.
///
/// `messages` persist across runs. The remaining fields describe the query
/// in flight and are reset by [`ConversationState::begin_turn`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub messages: Vec<Message>,

    #[serde(default)]
    pub route: Option<Route>,

    #[serde(default)]
    pub knowledge_text: Option<String>,

    #[serde(default)]
    pub web_text: Option<String>,

    /// Supplied per request, never persisted
    #[serde(skip)]
    pub web_search_enabled: bool,

    #[serde(default)]
    pub route_override: Option<RouteOverride>,
}

impl ConversationState {
    /// Start a new query: clear per-query fields and append the user turn.
    pub fn begin_turn(&mut self, query: impl Into<String>, web_search_enabled: bool) {
        self.route = None;
        self.knowledge_text = None;
        self.web_text = None;
        self.route_override = None;
        self.web_search_enabled = web_search_enabled;
        self.messages.push(Message::user(query));
    }

    /// Content of the most recent user-authored message.
    pub fn latest_user_turn(&self) -> AppResult<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .ok_or(AppError::NoUserTurnFound)
    }

    /// Content of the most recent assistant message.
    pub fn latest_assistant_turn(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }
}
