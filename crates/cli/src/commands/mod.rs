//! Command handlers for the PubMed assistant CLI.
//!
//! Each command builds its collaborators from the resolved configuration,
//! runs one engine operation and prints the result.

pub mod cite;
pub mod links;
pub mod mesh;
pub mod qa;
pub mod synth;

pub use cite::CiteCommand;
pub use links::LinksCommand;
pub use mesh::MeshCommand;
pub use qa::QaCommand;
pub use synth::SynthCommand;

use pubmed_core::{config::AppConfig, AppResult};
use pubmed_eutils::EutilsClient;
use pubmed_llm::{create_client, sanitize_prompt, LlmClient, SecurityConfig};
use pubmed_prompt::PromptSet;
use std::sync::Arc;

/// Validate the configuration and build the configured LLM client.
pub(crate) fn llm_client(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    config.validate()?;
    let endpoint = config.resolve_base_url();
    let api_key = config.resolve_api_key();
    tracing::debug!(provider = %config.provider, endpoint = ?endpoint, "Creating LLM client");
    create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())
}

pub(crate) fn literature_client(config: &AppConfig) -> AppResult<Arc<EutilsClient>> {
    let api_key = config.eutils.resolve_api_key();
    if api_key.is_none() {
        tracing::debug!("No NCBI API key; limited to 3 requests per second");
    }
    Ok(Arc::new(EutilsClient::new(&config.eutils, api_key)?))
}

/// Built-in prompts with workspace overrides from `.pubmed/prompts/`.
pub(crate) fn prompt_set(config: &AppConfig) -> AppResult<Arc<PromptSet>> {
    Ok(Arc::new(PromptSet::load(&config.workspace)?))
}

/// Coarse screening of a user question before it reaches the model.
pub(crate) fn sanitize_question(question: &str) -> AppResult<String> {
    sanitize_prompt(question, &SecurityConfig::default())
}
