//! Search, score, rank and compose: the synthesis pipeline.

use super::types::{SynthesisResult, TokenUsage};
use crate::cancel::{cancellable, ensure_active};
use crate::citation::{generate_ris, in_text_citation, Reference};
use crate::generate::{approx_tokens, generate};
use crate::relevance::{prompt_tokens, relevance_prompt, score_prompt, RelevanceScore};
use pubmed_core::{AppError, AppResult, SynthConfig};
use pubmed_eutils::{Article, LiteratureSource};
use pubmed_llm::LlmClient;
use pubmed_prompt::builtin::{SYNTH_COMPOSE, SYNTH_DEEP_DIVE};
use pubmed_prompt::PromptSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Output budget multiplier over the target word count for syntheses.
const COMPOSE_TOKENS_PER_WORD: usize = 3;
/// Output budget multiplier for single-paper summaries.
const DEEP_DIVE_TOKENS_PER_WORD: usize = 2;

/// An article with its relevance score, in scoring order.
#[derive(Debug, Clone)]
struct ScoredArticle {
    article: Article,
    score: u8,
}

/// Literature synthesis over PubMed.
///
/// Holds shared handles and configuration only, so one engine can serve
/// many concurrent calls.
pub struct SynthEngine {
    llm: Arc<dyn LlmClient>,
    literature: Arc<dyn LiteratureSource>,
    prompts: Arc<PromptSet>,
    model: String,
    config: SynthConfig,
}

impl SynthEngine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        literature: Arc<dyn LiteratureSource>,
        prompts: Arc<PromptSet>,
        model: impl Into<String>,
        config: SynthConfig,
    ) -> Self {
        Self {
            llm,
            literature,
            prompts,
            model: model.into(),
            config,
        }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Synthesize the literature answering `question`.
    ///
    /// Fails with [`AppError::NoDocumentsFound`] when the search is empty and
    /// [`AppError::BelowRelevanceThreshold`] when nothing scores high enough.
    pub async fn synthesize(
        &self,
        cancel: &CancellationToken,
        question: &str,
    ) -> AppResult<SynthesisResult> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidInput("question is empty".to_string()));
        }

        let breadth = self.config.effective_search_breadth();
        tracing::info!(breadth, "Searching PubMed");
        let found = cancellable(cancel, "search", self.literature.search(question, breadth)).await?;
        if found.ids.is_empty() {
            return Err(AppError::NoDocumentsFound {
                query: question.to_string(),
            });
        }
        let papers_searched = found.ids.len();

        let articles = cancellable(cancel, "fetch", self.literature.fetch(&found.ids)).await?;

        let mut input_tokens = 0;
        let mut output_tokens = 0;
        let mut scored = Vec::with_capacity(articles.len());
        for article in articles {
            ensure_active(cancel, "relevance")?;
            let relevance = self.score_or_neutral(cancel, question, &article).await?;
            tracing::debug!(pmid = %article.pmid, score = relevance.score, "Scored");
            input_tokens += relevance.input_tokens;
            output_tokens += relevance.output_tokens;
            scored.push(ScoredArticle {
                article,
                score: relevance.score,
            });
        }
        let papers_scored = scored.len();

        let selected = select_relevant(
            scored,
            self.config.relevance_threshold,
            self.config.papers_to_use,
        );
        if selected.is_empty() {
            return Err(AppError::BelowRelevanceThreshold {
                threshold: self.config.relevance_threshold,
                query: question.to_string(),
            });
        }
        tracing::info!(
            scored = papers_scored,
            used = selected.len(),
            threshold = self.config.relevance_threshold,
            "Selected papers"
        );

        let references: Vec<Reference> = selected
            .iter()
            .enumerate()
            .map(|(i, s)| Reference::from_article(&s.article, i + 1, Some(s.score)))
            .collect();

        ensure_active(cancel, "synthesis")?;
        let prompt = self.prompts.render(
            SYNTH_COMPOSE,
            [
                ("question", question.to_string()),
                ("papers", papers_context(&selected)),
                ("targetWords", self.config.target_words.to_string()),
                ("citations", citation_list(&selected)),
            ],
        )?;
        let max_tokens = token_budget(self.config.target_words, COMPOSE_TOKENS_PER_WORD);
        let synthesis = generate(
            self.llm.as_ref(),
            &self.model,
            &prompt,
            Some(max_tokens),
            cancel,
            "synthesis",
        )
        .await?;
        input_tokens += approx_tokens(&prompt.user);
        output_tokens += approx_tokens(&synthesis);

        Ok(SynthesisResult {
            question: question.to_string(),
            synthesis: synthesis.trim().to_string(),
            papers_searched,
            papers_scored,
            papers_used: references.len(),
            ris: generate_ris(&references),
            references,
            tokens: TokenUsage::new(input_tokens, output_tokens),
        })
    }

    /// Structured summary of the single article `pmid`.
    pub async fn synthesize_pmid(
        &self,
        cancel: &CancellationToken,
        pmid: &str,
    ) -> AppResult<SynthesisResult> {
        let pmid = pmid.trim();
        if pmid.is_empty() {
            return Err(AppError::InvalidInput("PMID is empty".to_string()));
        }

        let articles =
            cancellable(cancel, "fetch", self.literature.fetch(&[pmid.to_string()])).await?;
        let article = articles
            .into_iter()
            .next()
            .ok_or_else(|| AppError::DocumentNotFound(pmid.to_string()))?;

        let prompt = self.prompts.render(
            SYNTH_DEEP_DIVE,
            [
                ("targetWords", self.config.target_words.to_string()),
                ("title", article.title.clone()),
                ("abstract", article.abstract_text.clone()),
                ("citation", in_text_citation(&article)),
            ],
        )?;
        let max_tokens = token_budget(self.config.target_words, DEEP_DIVE_TOKENS_PER_WORD);
        let summary = generate(
            self.llm.as_ref(),
            &self.model,
            &prompt,
            Some(max_tokens),
            cancel,
            "synthesis",
        )
        .await?;

        let references = vec![Reference::from_article(&article, 1, None)];
        Ok(SynthesisResult {
            question: format!("Deep dive: PMID {}", pmid),
            synthesis: summary.trim().to_string(),
            papers_searched: 1,
            papers_scored: 0,
            papers_used: 1,
            ris: generate_ris(&references),
            references,
            tokens: TokenUsage::new(approx_tokens(&prompt.user), approx_tokens(&summary)),
        })
    }

    /// Score one article. Any model failure other than cancellation degrades
    /// to the neutral score, still charging the prompt that was sent.
    async fn score_or_neutral(
        &self,
        cancel: &CancellationToken,
        question: &str,
        article: &Article,
    ) -> AppResult<RelevanceScore> {
        let prompt = relevance_prompt(&self.prompts, question, article)?;
        match score_prompt(self.llm.as_ref(), &self.model, &prompt, &article.pmid, cancel).await {
            Err(e) if !e.is_cancelled() => {
                tracing::warn!(
                    pmid = %article.pmid,
                    kind = ?e.kind(),
                    error = %e,
                    "Relevance scoring failed, using neutral score"
                );
                Ok(RelevanceScore::neutral(prompt_tokens(&prompt)))
            }
            other => other,
        }
    }
}

/// Keep scores at or above `threshold`, best first (stable), at most `limit`.
fn select_relevant(scored: Vec<ScoredArticle>, threshold: u8, limit: usize) -> Vec<ScoredArticle> {
    let mut relevant: Vec<ScoredArticle> =
        scored.into_iter().filter(|s| s.score >= threshold).collect();
    relevant.sort_by(|a, b| b.score.cmp(&a.score));
    relevant.truncate(limit);
    relevant
}

fn papers_context(papers: &[ScoredArticle]) -> String {
    papers
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "[{}] {} (PMID {})\nTitle: {}\nAbstract: {}\n",
                i + 1,
                in_text_citation(&s.article),
                s.article.pmid,
                s.article.title,
                s.article.abstract_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

fn citation_list(papers: &[ScoredArticle]) -> String {
    papers
        .iter()
        .map(|s| in_text_citation(&s.article))
        .collect::<Vec<_>>()
        .join("; ")
}

fn token_budget(target_words: usize, per_word: usize) -> u32 {
    u32::try_from(target_words.saturating_mul(per_word)).unwrap_or(u32::MAX)
}
