//! Prompt loader for YAML prompt definitions.
//!
//! A workspace may override any built-in prompt by placing
//! `.axon/prompts/<id>.yml` next to its config.

use crate::builtin::builtin_yaml;
use crate::types::PromptDefinition;
use axon_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by ID.
///
/// The workspace override wins over the built-in definition.
///
/// # Example
/// ```no_run
/// use axon_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "agent.router")?;
/// println!("Loaded prompt: {}", prompt.description);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".axon/prompts")
        .join(format!("{}.yml", prompt_id));

    let (contents, origin) = if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);
        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;
        (contents, prompt_file.display().to_string())
    } else {
        let contents = builtin_yaml(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;
        (contents.to_string(), "built-in".to_string())
    };

    let definition = parse_prompt(&contents, &origin)?;

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt {} declares id '{}', expected '{}'",
            origin, definition.id, prompt_id
        )));
    }

    tracing::debug!("Loaded prompt: {} from {}", definition.id, origin);

    Ok(definition)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e))
    })?;

    validate_prompt(&definition)?;
    Ok(definition)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Prompt {} has an empty template",
            def.id
        )));
    }

    if let Some(name) = def.variables.iter().find(|name| name.trim().is_empty()) {
        return Err(AppError::Prompt(format!(
            "Prompt {} declares an invalid variable name {:?}",
            def.id, name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{builtin_ids, JUDGE_PROMPT_ID, ROUTER_PROMPT_ID};
    use std::fs;
    use tempfile::TempDir;

    fn write_override(dir: &Path, id: &str, body: &str) {
        let prompts_dir = dir.join(".axon/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), body).unwrap();
    }

    #[test]
    fn test_all_builtins_parse() {
        let temp_dir = TempDir::new().unwrap();
        for id in builtin_ids() {
            let prompt = load_prompt(temp_dir.path(), id).unwrap();
            assert_eq!(prompt.id, id);
        }
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            JUDGE_PROMPT_ID,
            r#"
id: agent.judge
description: Strict judge
variables: [query, retrieved]
system: "Be strict."
template: "{{query}} / {{retrieved}}"
output: json
"#,
        );

        let prompt = load_prompt(temp_dir.path(), JUDGE_PROMPT_ID).unwrap();
        assert_eq!(prompt.description, "Strict judge");
        assert_eq!(prompt.system.as_deref(), Some("Be strict."));
    }

    #[test]
    fn test_override_with_wrong_id_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            ROUTER_PROMPT_ID,
            r#"
id: something.else
template: "{{query}}"
output: json
"#,
        );

        assert!(load_prompt(temp_dir.path(), ROUTER_PROMPT_ID).is_err());
    }

    #[test]
    fn test_empty_template_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), ROUTER_PROMPT_ID, "id: agent.router\ntemplate: \"  \"\n");
        assert!(load_prompt(temp_dir.path(), ROUTER_PROMPT_ID).is_err());
    }

    #[test]
    fn test_invalid_yaml_override() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), ROUTER_PROMPT_ID, "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), ROUTER_PROMPT_ID).is_err());
    }

    #[test]
    fn test_unknown_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }
}
