//! Prompt system for the PubMed assistant.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, compiled in as defaults
//! - Per-workspace overrides in `.pubmed/prompts/`
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod set;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt};
pub use set::PromptSet;
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptInputSpec,
    PromptOutputSpec,
};
