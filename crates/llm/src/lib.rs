//! Generative-text integration for the PubMed assistant.
//!
//! This crate provides a provider-agnostic abstraction over text-generation
//! backends. The engine only ever sees [`LlmClient`]; concrete providers live
//! under [`providers`] and are selected with [`create_client`].
//!
//! # Providers
//! - **OpenAI-compatible**: any `/chat/completions` endpoint (default)
//! - **Ollama**: local runtime
//!
//! # Example
//! ```no_run
//! use pubmed_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("https://api.openai.com/v1", Some("sk-...".into()))?;
//! let request = LlmRequest::new("Is aspirin an NSAID?", "gpt-4o").with_max_tokens(10);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod sanitize;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use sanitize::{sanitize_prompt, SecurityConfig};
pub use types::ProviderType;
