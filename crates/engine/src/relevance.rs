//! LLM-judged relevance of one article to a question.

use crate::generate::{approx_tokens, generate};
use pubmed_core::AppResult;
use pubmed_eutils::Article;
use pubmed_llm::LlmClient;
use pubmed_prompt::builtin::SYNTH_RELEVANCE;
use pubmed_prompt::{BuiltPrompt, PromptSet};
use regex::Regex;
use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;

/// Score used when a response holds no usable number.
pub const NEUTRAL_SCORE: u8 = 5;

/// Abstract excerpt length shown to the scorer, in characters.
pub const ABSTRACT_EXCERPT_CHARS: usize = 500;

/// Fixed overhead added to the scoring token estimate.
const SCORING_OVERHEAD_TOKENS: usize = 5;

static SCORE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b(10|[1-9])\b").ok());

/// Outcome of scoring one article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceScore {
    /// 1..=10
    pub score: u8,
    /// False when the response was unparseable and [`NEUTRAL_SCORE`] was used
    pub parsed: bool,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl RelevanceScore {
    /// A neutral score for an article that could not be judged.
    pub fn neutral(input_tokens: usize) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            parsed: false,
            input_tokens,
            output_tokens: 0,
        }
    }
}

/// First standalone number from 1 to 10 in `response`.
pub fn parse_score(response: &str) -> Option<u8> {
    SCORE
        .as_ref()?
        .captures(response)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Ask the model to rate `article` against `question`.
///
/// Fails only when the model call fails (or is cancelled). An unparseable
/// answer yields [`NEUTRAL_SCORE`] with `parsed == false`.
pub async fn score_relevance(
    llm: &dyn LlmClient,
    prompts: &PromptSet,
    model: &str,
    question: &str,
    article: &Article,
    cancel: &CancellationToken,
) -> AppResult<RelevanceScore> {
    let prompt = relevance_prompt(prompts, question, article)?;
    score_prompt(llm, model, &prompt, &article.pmid, cancel).await
}

/// The rubric prompt for one article, abstract cut to an excerpt.
pub fn relevance_prompt(
    prompts: &PromptSet,
    question: &str,
    article: &Article,
) -> AppResult<BuiltPrompt> {
    prompts.render(
        SYNTH_RELEVANCE,
        [
            ("question", question.to_string()),
            ("title", article.title.clone()),
            ("abstract", abstract_excerpt(&article.abstract_text)),
        ],
    )
}

/// Estimated input cost of sending `prompt` to the scorer.
pub fn prompt_tokens(prompt: &BuiltPrompt) -> usize {
    approx_tokens(&prompt.user) + SCORING_OVERHEAD_TOKENS
}

/// Send an already rendered scoring prompt and parse the reply.
pub async fn score_prompt(
    llm: &dyn LlmClient,
    model: &str,
    prompt: &BuiltPrompt,
    pmid: &str,
    cancel: &CancellationToken,
) -> AppResult<RelevanceScore> {
    let response = generate(llm, model, prompt, None, cancel, "relevance").await?;

    let (score, parsed) = match parse_score(&response) {
        Some(score) => (score, true),
        None => {
            tracing::warn!(
                %pmid,
                response = %response.trim(),
                "Unparseable relevance score, using neutral {}",
                NEUTRAL_SCORE
            );
            (NEUTRAL_SCORE, false)
        }
    };

    Ok(RelevanceScore {
        score,
        parsed,
        input_tokens: prompt_tokens(prompt),
        output_tokens: approx_tokens(&response),
    })
}

fn abstract_excerpt(text: &str) -> String {
    if text.chars().count() <= ABSTRACT_EXCERPT_CHARS {
        return text.to_string();
    }
    let mut excerpt: String = text.chars().take(ABSTRACT_EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}
