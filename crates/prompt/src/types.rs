//! Prompt definition types.

use serde::{Deserialize, Serialize};

/// What a prompt asks the model to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Free-form prose
    #[default]
    Text,
    /// A single JSON object
    Json,
}

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub id: String,

    #[serde(default)]
    pub description: String,

    /// Variables every render must supply
    #[serde(default)]
    pub variables: Vec<String>,

    /// Optional system message template (Handlebars)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message template (Handlebars)
    pub template: String,

    #[serde(default)]
    pub output: OutputKind,
}

/// A rendered prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltPrompt {
    pub system: Option<String>,
    pub user: String,
    pub output: OutputKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: test.prompt
description: Test Prompt
variables: [query, subject]
system: "You judge {{subject}}"
template: "{{query}}"
output: json
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "test.prompt");
        assert_eq!(def.variables, vec!["query", "subject"]);
        assert_eq!(def.system.as_deref(), Some("You judge {{subject}}"));
        assert_eq!(def.output, OutputKind::Json);
    }

    #[test]
    fn test_optional_fields_default() {
        let def: PromptDefinition = serde_yaml::from_str("id: plain\ntemplate: \"{{query}}\"\n").unwrap();
        assert!(def.system.is_none());
        assert!(def.variables.is_empty());
        assert_eq!(def.output, OutputKind::Text);
    }

    #[test]
    fn test_unknown_output_kind_is_rejected() {
        let result: Result<PromptDefinition, _> =
            serde_yaml::from_str("id: x\ntemplate: y\noutput: markdown\n");
        assert!(result.is_err());
    }
}
