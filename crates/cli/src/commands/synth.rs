//! `pubmed synth`: literature synthesis and single-paper deep dives.

use super::{literature_client, llm_client, prompt_set, sanitize_question};
use crate::output::{print_json, render_markdown, write_bibtex_file, write_ris_file};
use clap::Args;
use pubmed_core::{config::AppConfig, AppResult};
use pubmed_engine::SynthEngine;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Synthesize the literature on a question
#[derive(Args, Debug)]
pub struct SynthCommand {
    /// Research question
    #[arg(required_unless_present = "pmid")]
    pub question: Option<String>,

    /// Summarize a single paper instead of searching
    #[arg(long, conflicts_with = "question")]
    pub pmid: Option<String>,

    /// Papers to include in the synthesis
    #[arg(long)]
    pub papers: Option<usize>,

    /// Papers to search before relevance filtering
    #[arg(long)]
    pub search: Option<usize>,

    /// Minimum relevance score (1-10)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub relevance: Option<u8>,

    /// Target length in words
    #[arg(long)]
    pub words: Option<usize>,

    /// Write references as RIS
    #[arg(long)]
    pub ris: Option<PathBuf>,

    /// Write references as BibTeX
    #[arg(long)]
    pub bibtex: Option<PathBuf>,
}

impl SynthCommand {
    pub async fn execute(
        &self,
        config: &AppConfig,
        cancel: &CancellationToken,
        json: bool,
    ) -> AppResult<()> {
        tracing::info!("Executing synth command");

        let mut config = config.clone();
        if let Some(papers) = self.papers {
            config.synth.papers_to_use = papers;
        }
        if let Some(search) = self.search {
            config.synth.papers_to_search = search;
        }
        if let Some(relevance) = self.relevance {
            config.synth.relevance_threshold = relevance;
        }
        if let Some(words) = self.words {
            config.synth.target_words = words;
        }

        let engine = SynthEngine::new(
            llm_client(&config)?,
            literature_client(&config)?,
            prompt_set(&config)?,
            config.model.clone(),
            config.synth.clone(),
        );

        let result = match (&self.pmid, &self.question) {
            (Some(pmid), _) => engine.synthesize_pmid(cancel, pmid).await?,
            (None, Some(question)) => {
                let question = sanitize_question(question)?;
                engine.synthesize(cancel, &question).await?
            }
            (None, None) => {
                return Err(pubmed_core::AppError::InvalidInput(
                    "a question or --pmid is required".to_string(),
                ))
            }
        };

        if let Some(path) = &self.ris {
            write_ris_file(path, &result.references)?;
            eprintln!("✓ Wrote {} ({} references)", path.display(), result.references.len());
        }
        if let Some(path) = &self.bibtex {
            write_bibtex_file(path, &result.references)?;
            eprintln!("✓ Wrote {} ({} references)", path.display(), result.references.len());
        }

        if json {
            print_json(&result)
        } else {
            print!("{}", render_markdown(&result));
            Ok(())
        }
    }
}
