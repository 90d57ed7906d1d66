//! `pubmed cite`: citations for known PMIDs, no generation involved.

use super::literature_client;
use crate::output::print_json;
use clap::{Args, ValueEnum};
use pubmed_core::{config::AppConfig, AppError, AppResult};
use pubmed_engine::cancel::cancellable;
use pubmed_engine::{generate_bibtex, generate_ris, Reference};
use pubmed_eutils::LiteratureSource;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CiteFormat {
    Apa,
    Ris,
    Bibtex,
}

/// Format citations for PubMed articles
#[derive(Args, Debug)]
pub struct CiteCommand {
    /// One or more PMIDs
    #[arg(required = true)]
    pub pmids: Vec<String>,

    /// Citation format
    #[arg(short, long, value_enum, default_value = "apa")]
    pub format: CiteFormat,
}

impl CiteCommand {
    pub async fn execute(
        &self,
        config: &AppConfig,
        cancel: &CancellationToken,
        json: bool,
    ) -> AppResult<()> {
        tracing::info!(count = self.pmids.len(), format = ?self.format, "Executing cite command");

        let literature = literature_client(config)?;
        let articles = cancellable(cancel, "fetch", literature.fetch(&self.pmids)).await?;

        for pmid in &self.pmids {
            if !articles.iter().any(|a| &a.pmid == pmid) {
                tracing::warn!(%pmid, "Article not returned by PubMed");
            }
        }
        if articles.is_empty() {
            return Err(AppError::DocumentNotFound(self.pmids.join(", ")));
        }

        let references: Vec<Reference> = articles
            .iter()
            .enumerate()
            .map(|(i, article)| Reference::from_article(article, i + 1, None))
            .collect();

        if json {
            return print_json(&references);
        }

        match self.format {
            CiteFormat::Apa => {
                for reference in &references {
                    println!("{}. {}", reference.rank, reference.citation_apa);
                }
            }
            CiteFormat::Ris => print!("{}", generate_ris(&references)),
            CiteFormat::Bibtex => print!("{}", generate_bibtex(&references)),
        }
        Ok(())
    }
}
