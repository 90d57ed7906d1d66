//! `pubmed qa`: adaptive yes/no answers.

use super::{literature_client, llm_client, prompt_set, sanitize_question};
use crate::output::{format_explained, print_json};
use clap::Args;
use pubmed_core::{config::AppConfig, AppResult};
use pubmed_engine::QaEngine;
use tokio_util::sync::CancellationToken;

/// Answer a biomedical yes/no question
#[derive(Args, Debug)]
pub struct QaCommand {
    /// The question, e.g. "Does metformin reduce cancer risk?"
    pub question: String,

    /// Confidence (1-10) required to answer without retrieval
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub confidence: Option<u8>,

    /// Always retrieve PubMed evidence
    #[arg(long, conflicts_with = "parametric")]
    pub retrieve: bool,

    /// Never retrieve; answer from model knowledge
    #[arg(long)]
    pub parametric: bool,

    /// Show strategy, confidence, sources and evidence
    #[arg(long)]
    pub explain: bool,
}

impl QaCommand {
    pub async fn execute(
        &self,
        config: &AppConfig,
        cancel: &CancellationToken,
        json: bool,
    ) -> AppResult<()> {
        tracing::info!("Executing qa command");

        let mut config = config.clone();
        if let Some(threshold) = self.confidence {
            config.qa.confidence_threshold = threshold;
        }
        if self.retrieve {
            config.qa.force_retrieval = true;
            config.qa.force_parametric = false;
        }
        if self.parametric {
            config.qa.force_parametric = true;
            config.qa.force_retrieval = false;
        }

        let question = sanitize_question(&self.question)?;
        let engine = QaEngine::new(
            llm_client(&config)?,
            literature_client(&config)?,
            prompt_set(&config)?,
            config.model.clone(),
            config.qa.clone(),
        );

        let result = engine.answer(cancel, &question).await?;

        if json {
            print_json(&result)
        } else if self.explain {
            print!("{}", format_explained(&result));
            Ok(())
        } else {
            println!("{}", result.answer);
            Ok(())
        }
    }
}
