//! The set of prompts an engine renders from.

use crate::builder::build_prompt;
use crate::builtin::builtin_definitions;
use crate::loader::{list_prompts, load_prompt};
use crate::types::{BuiltPrompt, PromptDefinition};
use pubmed_core::{AppError, AppResult};
use std::collections::HashMap;
use std::path::Path;

/// Built-in prompts, optionally overridden per workspace. Immutable once built.
#[derive(Debug, Clone)]
pub struct PromptSet {
    prompts: HashMap<String, PromptDefinition>,
}

impl PromptSet {
    /// Only the compiled-in prompts.
    pub fn builtin() -> AppResult<Self> {
        let prompts = builtin_definitions()?
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect();
        Ok(Self { prompts })
    }

    /// Built-ins with any `.pubmed/prompts/<id>.yml` in `workspace` layered on top.
    pub fn load(workspace: &Path) -> AppResult<Self> {
        let mut set = Self::builtin()?;
        for id in list_prompts(workspace)? {
            let def = load_prompt(workspace, &id)?;
            if !set.prompts.contains_key(&id) {
                tracing::warn!(prompt = %id, "Prompt override does not match a known prompt id");
            }
            set.prompts.insert(id, def);
        }
        Ok(set)
    }

    /// Look up a definition.
    pub fn get(&self, id: &str) -> AppResult<&PromptDefinition> {
        self.prompts
            .get(id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", id)))
    }

    /// Render prompt `id` with `variables`.
    pub fn render<I, K, V>(&self, id: &str, variables: I) -> AppResult<BuiltPrompt>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = variables
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        build_prompt(self.get(id)?, vars)
    }

    /// All known prompt ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.prompts.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
