//! Adaptive question answering and literature synthesis over PubMed.
//!
//! Two entry points share the same collaborators:
//!
//! - [`QaEngine`] decides whether a model's own knowledge is good enough for
//!   a yes/no question or whether retrieved abstracts should be added.
//! - [`SynthEngine`] searches, scores, ranks and composes a cited synthesis.
//!
//! The pure helpers ([`detect_novelty`], [`expand_query`], [`minify_abstract`],
//! [`generate_ris`], [`generate_bibtex`], [`format_apa`]) are exported for
//! callers that build their own pipelines.
//!
//! # Example
//!
//! ```no_run
//! use pubmed_core::SynthConfig;
//! use pubmed_engine::SynthEngine;
//! use pubmed_eutils::EutilsClient;
//! use pubmed_prompt::PromptSet;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> pubmed_core::AppResult<()> {
//! let llm = pubmed_llm::create_client("ollama", None, None)?;
//! let literature = Arc::new(EutilsClient::new(&Default::default(), None)?);
//! let engine = SynthEngine::new(
//!     llm,
//!     literature,
//!     Arc::new(PromptSet::builtin()?),
//!     "llama3.2",
//!     SynthConfig::default(),
//! );
//! let result = engine
//!     .synthesize(&CancellationToken::new(), "Does metformin prevent cancer?")
//!     .await?;
//! println!("{}", result.synthesis);
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod citation;
pub mod generate;
pub mod minify;
pub mod novelty;
pub mod qa;
pub mod query;
pub mod relevance;
pub mod synth;

pub use citation::{format_apa, generate_bibtex, generate_ris, Reference};
pub use minify::minify_abstract;
pub use novelty::detect_novelty;
pub use qa::{AnswerResult, QaEngine, Strategy};
pub use query::expand_query;
pub use relevance::{parse_score, score_relevance, RelevanceScore, NEUTRAL_SCORE};
pub use synth::{SynthEngine, SynthesisResult, TokenUsage};

#[cfg(test)]
mod tests;
