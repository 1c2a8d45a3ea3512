//! Prompt definitions compiled into the binary.

/// Router prompt id.
pub const ROUTER_PROMPT_ID: &str = "agent.router";

/// Sufficiency judge prompt id.
pub const JUDGE_PROMPT_ID: &str = "agent.judge";

/// Answer synthesis prompt id.
pub const ANSWER_PROMPT_ID: &str = "agent.answer";

const BUILTIN: &[(&str, &str)] = &[
    (ROUTER_PROMPT_ID, include_str!("../prompts/agent.router.yml")),
    (JUDGE_PROMPT_ID, include_str!("../prompts/agent.judge.yml")),
    (ANSWER_PROMPT_ID, include_str!("../prompts/agent.answer.yml")),
];

/// Raw YAML of a built-in prompt.
pub fn builtin_yaml(prompt_id: &str) -> Option<&'static str> {
    BUILTIN
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(_, yaml)| *yaml)
}

/// Ids of all built-in prompts.
pub fn builtin_ids() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(id, _)| *id)
}
