//! Typed outputs of the router and judge inference calls.

use crate::state::Route;
use serde::{Deserialize, Serialize};

/// Reply used when the router picks `end` without supplying one.
pub const FALLBACK_GREETING: &str = "Hello!";

/// Router output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub route: Route,

    /// Filled only when `route` is `end`
    #[serde(default)]
    pub reply: Option<String>,
}

impl RouteDecision {
    /// Reply for the `end` shortcut, defaulting when missing or blank.
    pub fn reply_or_default(&self) -> String {
        self.reply
            .as_deref()
            .map(str::trim)
            .filter(|reply| !reply.is_empty())
            .unwrap_or(FALLBACK_GREETING)
            .to_string()
    }
}

/// Judge output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SufficiencyVerdict {
    pub sufficient: bool,
}
