//! Confidence-gated choice between the model's knowledge and retrieval.

use super::parse::{confidence_or_neutral, parse_answer};
use super::types::{AnswerResult, Strategy};
use crate::cancel::{cancellable, ensure_active};
use crate::generate::generate;
use crate::minify::minify_abstract;
use crate::novelty::detect_novelty;
use crate::query::expand_query;
use pubmed_core::{AppError, AppResult, QaConfig};
use pubmed_eutils::{Article, LiteratureSource};
use pubmed_llm::LlmClient;
use pubmed_prompt::builtin::{QA_CONFIDENCE, QA_EVIDENCE, QA_PARAMETRIC};
use pubmed_prompt::PromptSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Answers yes/no questions, retrieving PubMed evidence only when needed.
///
/// Holds shared handles and configuration only, so one engine can serve
/// many concurrent calls.
pub struct QaEngine {
    llm: Arc<dyn LlmClient>,
    literature: Arc<dyn LiteratureSource>,
    prompts: Arc<PromptSet>,
    model: String,
    config: QaConfig,
}

/// Why a strategy was picked. Logged, not returned.
#[derive(Debug, Clone, Copy)]
enum Decision {
    ForcedParametric,
    ForcedRetrieval,
    Novel,
    Confident { confidence: u8 },
    Unsure { confidence: u8 },
}

impl Decision {
    fn strategy(self) -> Strategy {
        match self {
            Decision::ForcedParametric | Decision::Confident { .. } => Strategy::Parametric,
            Decision::ForcedRetrieval | Decision::Novel | Decision::Unsure { .. } => {
                Strategy::Retrieval
            }
        }
    }

    /// Self-rated confidence, 0 when the model was not asked.
    fn confidence(self) -> u8 {
        match self {
            Decision::Confident { confidence } | Decision::Unsure { confidence } => confidence,
            Decision::ForcedParametric | Decision::ForcedRetrieval | Decision::Novel => 0,
        }
    }
}

/// An answer with the evidence it rests on, if any.
struct Grounded {
    answer: String,
    sources: Vec<String>,
    context: String,
}

impl Grounded {
    fn unsourced(answer: String) -> Self {
        Self {
            answer,
            sources: Vec::new(),
            context: String::new(),
        }
    }
}

impl QaEngine {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        literature: Arc<dyn LiteratureSource>,
        prompts: Arc<PromptSet>,
        model: impl Into<String>,
        config: QaConfig,
    ) -> Self {
        Self {
            llm,
            literature,
            prompts,
            model: model.into(),
            config,
        }
    }

    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Answer `question`.
    ///
    /// Strategy is decided first, in priority order: forced parametric,
    /// forced retrieval, novelty, then the model's self-reported confidence
    /// against the threshold. A retrieval that finds nothing falls back to a
    /// parametric answer and still reports [`Strategy::Retrieval`].
    pub async fn answer(
        &self,
        cancel: &CancellationToken,
        question: &str,
    ) -> AppResult<AnswerResult> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidInput("question is empty".to_string()));
        }

        let novel = detect_novelty(question);
        let (decision, tentative) = if self.config.force_parametric {
            (Decision::ForcedParametric, None)
        } else if self.config.force_retrieval {
            (Decision::ForcedRetrieval, None)
        } else if novel {
            (Decision::Novel, None)
        } else {
            let (confidence, tentative) = self.assess_confidence(cancel, question).await?;
            if confidence >= self.config.confidence_threshold {
                (Decision::Confident { confidence }, Some(tentative))
            } else {
                (Decision::Unsure { confidence }, None)
            }
        };

        let strategy = decision.strategy();
        tracing::info!(
            %strategy,
            ?decision,
            threshold = self.config.confidence_threshold,
            "Answer strategy decided"
        );

        let grounded = match (decision, tentative) {
            (_, Some(answer)) => Grounded::unsourced(answer),
            (Decision::ForcedParametric, None) => {
                Grounded::unsourced(self.answer_parametric(cancel, question).await?)
            }
            _ => self.answer_with_retrieval(cancel, question).await?,
        };

        Ok(AnswerResult {
            question: question.to_string(),
            answer: grounded.answer,
            confidence: decision.confidence(),
            strategy,
            novel,
            sources: grounded.sources,
            context: grounded.context,
        })
    }

    /// Ask for a tentative answer plus self-rated confidence.
    async fn assess_confidence(
        &self,
        cancel: &CancellationToken,
        question: &str,
    ) -> AppResult<(u8, String)> {
        let prompt = self.prompts.render(QA_CONFIDENCE, [("question", question)])?;
        let response =
            generate(self.llm.as_ref(), &self.model, &prompt, None, cancel, "confidence").await?;
        Ok((confidence_or_neutral(&response), parse_answer(&response)))
    }

    async fn answer_parametric(
        &self,
        cancel: &CancellationToken,
        question: &str,
    ) -> AppResult<String> {
        let prompt = self.prompts.render(QA_PARAMETRIC, [("question", question)])?;
        let response =
            generate(self.llm.as_ref(), &self.model, &prompt, None, cancel, "answer").await?;
        Ok(parse_answer(&response))
    }

    async fn answer_with_retrieval(
        &self,
        cancel: &CancellationToken,
        question: &str,
    ) -> AppResult<Grounded> {
        let query = expand_query(question);
        tracing::debug!(%query, "Searching for evidence");

        let articles = self.retrieve(cancel, &query).await?;
        if articles.is_empty() {
            tracing::info!(%query, "No evidence found, answering from model knowledge");
            return Ok(Grounded::unsourced(self.answer_parametric(cancel, question).await?));
        }

        let per_article = self.config.evidence_chars / articles.len();
        let evidence = articles
            .iter()
            .map(|article| {
                format!(
                    "[PMID {}] {}\n{}",
                    article.pmid,
                    article.title,
                    minify_abstract(&article.abstract_text, per_article)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        ensure_active(cancel, "answer")?;
        let prompt = self.prompts.render(
            QA_EVIDENCE,
            [("question", question), ("evidence", evidence.as_str())],
        )?;
        let response =
            generate(self.llm.as_ref(), &self.model, &prompt, None, cancel, "answer").await?;

        Ok(Grounded {
            answer: parse_answer(&response),
            sources: articles.into_iter().map(|a| a.pmid).collect(),
            context: evidence,
        })
    }

    /// Search then fetch; an empty search skips the fetch.
    async fn retrieve(&self, cancel: &CancellationToken, query: &str) -> AppResult<Vec<Article>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let found = cancellable(
            cancel,
            "search",
            self.literature.search(query, self.config.max_results),
        )
        .await?;
        if found.ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut articles =
            cancellable(cancel, "fetch", self.literature.fetch(&found.ids)).await?;
        articles.truncate(self.config.max_results);
        Ok(articles)
    }
}
