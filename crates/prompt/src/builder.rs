//! Handlebars rendering of prompt definitions.

use crate::types::{BuiltPrompt, PromptDefinition};
use axon_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// Render the system and user templates of `definition` against `variables`.
///
/// Every variable the definition declares must be present; templates may
/// still reference undeclared ones, which render empty. HTML escaping is
/// disabled.
///
/// # Example
/// ```no_run
/// use axon_prompt::{build_prompt, load_prompt};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(Path::new("."), "agent.router")?;
/// let vars = serde_json::json!({ "query": "Hi", "web_search_enabled": true });
/// let built = build_prompt(&def, &vars)?;
/// println!("System prompt: {:?}", built.system);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt<V: Serialize>(definition: &PromptDefinition, variables: &V) -> AppResult<BuiltPrompt> {
    tracing::trace!("Building prompt: {}", definition.id);

    let values = serde_json::to_value(variables)?;
    if let Some(missing) = definition
        .variables
        .iter()
        .find(|name| values.get(name.as_str()).is_none())
    {
        return Err(AppError::Prompt(format!(
            "Prompt {} requires variable '{}'",
            definition.id, missing
        )));
    }

    let system = definition
        .system
        .as_deref()
        .map(|template| render_template(template, &values))
        .transpose()?
        .map(|s| s.trim().to_string());

    let user = render_template(&definition.template, &values)?;

    Ok(BuiltPrompt {
        system,
        user: user.trim_end().to_string(),
        output: definition.output,
    })
}

/// Render a Handlebars template with variables.
fn render_template<V: Serialize>(template: &str, variables: &V) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
