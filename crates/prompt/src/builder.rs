//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
use handlebars::Handlebars;
use pubmed_core::{AppError, AppResult};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Every variable declared under `input.variables` must be supplied.
/// Templates render in strict mode, so a typo in an override surfaces as
/// `AppError::Prompt` instead of silently rendering an empty string.
///
/// # Example
/// ```no_run
/// use pubmed_prompt::{build_prompt, PromptDefinition};
/// use std::collections::HashMap;
///
/// # fn example(def: PromptDefinition) -> Result<(), Box<dyn std::error::Error>> {
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "Does aspirin reduce pain?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::trace!("Building prompt: {}", definition.id);

    if let Some(missing) = definition
        .input
        .variables
        .iter()
        .find(|name| !variables.contains_key(*name))
    {
        return Err(AppError::Prompt(format!(
            "Prompt '{}' requires variable '{}'",
            definition.id, missing
        )));
    }

    let user = render_template(&definition.id, &definition.template, &variables)?;

    Ok(BuiltPrompt {
        user,
        max_tokens: definition.behavior.max_tokens,
        temperature: definition.behavior.temperature,
        metadata: BuiltPromptMetadata {
            source_prompt_id: definition.id.clone(),
            resolved_variables: variables,
        },
    })
}

/// Render a Handlebars template with variables.
fn render_template(
    name: &str,
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, not HTML
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string(name, template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template {}: {}", name, e)))?;

    handlebars
        .render(name, variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template {}: {}", name, e)))
}
