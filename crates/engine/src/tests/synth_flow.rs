//! End-to-end synthesis and deep-dive runs.

use super::mock::{article, MockLiterature, MockLlm, Reply};
use crate::relevance::{prompt_tokens, relevance_prompt, score_relevance};
use crate::synth::SynthEngine;
use pretty_assertions::assert_eq;
use pubmed_core::{AppError, ErrorKind, SynthConfig};
use pubmed_eutils::Author;
use pubmed_prompt::PromptSet;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const QUESTION: &str = "Does metformin reduce cancer incidence?";

fn engine(llm: &Arc<MockLlm>, literature: &Arc<MockLiterature>, config: SynthConfig) -> SynthEngine {
    SynthEngine::new(
        llm.clone(),
        literature.clone(),
        Arc::new(PromptSet::builtin().unwrap()),
        "test-model",
        config,
    )
}

fn corpus() -> Arc<MockLiterature> {
    Arc::new(MockLiterature::new(vec![
        article("1", "Smith", "2024"),
        article("2", "Doe", "2023"),
        article("3", "Lee", "2022"),
        article("4", "Kim", "2021"),
    ]))
}

#[tokio::test]
async fn test_synthesis_ranks_and_cites() {
    let llm = Arc::new(MockLlm::new([
        "8",
        "3",
        "Relevance: 9/10",
        "7",
        "  Metformin lowers incidence (Lee, 2022; Smith, 2024).  ",
    ]));
    let literature = corpus();

    let result = engine(&llm, &literature, SynthConfig::default())
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap();

    assert_eq!(result.papers_searched, 4);
    assert_eq!(result.papers_scored, 4);
    assert_eq!(result.papers_used, 3);
    assert_eq!(
        result.synthesis,
        "Metformin lowers incidence (Lee, 2022; Smith, 2024)."
    );

    let ranked: Vec<(usize, &str, Option<u8>)> = result
        .references
        .iter()
        .map(|r| (r.rank, r.pmid.as_str(), r.relevance_score))
        .collect();
    assert_eq!(
        ranked,
        vec![(1, "3", Some(9)), (2, "1", Some(8)), (3, "4", Some(7))]
    );
    assert_eq!(result.references[0].key, "Lee 2022");

    assert!(result.ris.starts_with("TY  - JOUR"));
    assert_eq!(result.ris.matches("ER  -").count(), 3);

    assert!(result.tokens.input > 0);
    assert!(result.tokens.output > 0);
    assert_eq!(result.tokens.total, result.tokens.input + result.tokens.output);
}

#[tokio::test]
async fn test_compose_request() {
    let llm = Arc::new(MockLlm::new(["9", "8", "2", "2", "Synthesis."]));
    let literature = corpus();
    let config = SynthConfig {
        target_words: 100,
        ..Default::default()
    };

    engine(&llm, &literature, config)
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap();

    let requests = llm.requests();
    assert_eq!(requests.len(), 5);
    assert_eq!(requests[0].max_tokens, Some(10));

    let compose = &requests[4];
    assert_eq!(compose.max_tokens, Some(300));
    assert!(compose.prompt.contains("approximately 100 words"));
    assert!(compose
        .prompt
        .contains("Available citations: Smith, 2024; Doe, 2023"));
    assert!(compose.prompt.contains("[1] Smith, 2024 (PMID 1)\nTitle: Study 1"));
    assert!(compose.prompt.contains("\n---\n[2] Doe, 2023 (PMID 2)"));
}

#[tokio::test]
async fn test_papers_to_use_caps_output() {
    let llm = Arc::new(MockLlm::new(["9", "9", "9", "9", "Synthesis."]));
    let config = SynthConfig {
        papers_to_use: 2,
        ..Default::default()
    };

    let result = engine(&llm, &corpus(), config)
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap();

    let pmids: Vec<&str> = result.references.iter().map(|r| r.pmid.as_str()).collect();
    assert_eq!(pmids, vec!["1", "2"]);
    assert_eq!(result.papers_scored, 4);
}

#[tokio::test]
async fn test_search_breadth_raised_to_papers_to_use() {
    let llm = Arc::new(MockLlm::new(["9", "9", "9", "9", "Synthesis."]));
    let literature = corpus();
    let config = SynthConfig {
        papers_to_use: 10,
        papers_to_search: 3,
        ..Default::default()
    };

    engine(&llm, &literature, config)
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap();

    assert_eq!(literature.searches(), vec![(QUESTION.to_string(), 10)]);
}

#[tokio::test]
async fn test_scoring_failures_degrade_to_neutral() {
    let llm = Arc::new(MockLlm::scripted([
        Reply::Fail("rate limited".to_string()),
        Reply::Text("8".to_string()),
        Reply::Text("no idea".to_string()),
        Reply::Text("2".to_string()),
        Reply::Text("Synthesis.".to_string()),
    ]));
    let config = SynthConfig {
        relevance_threshold: 5,
        ..Default::default()
    };

    let result = engine(&llm, &corpus(), config)
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap();

    let ranked: Vec<(&str, Option<u8>)> = result
        .references
        .iter()
        .map(|r| (r.pmid.as_str(), r.relevance_score))
        .collect();
    assert_eq!(ranked, vec![("2", Some(8)), ("1", Some(5)), ("3", Some(5))]);
}

#[tokio::test]
async fn test_any_scoring_error_degrades_to_neutral() {
    let llm = Arc::new(MockLlm::scripted([
        Reply::Error(AppError::Io(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "model process exited",
        ))),
        Reply::Text("8".to_string()),
        Reply::Text("Synthesis.".to_string()),
    ]));
    let literature = Arc::new(MockLiterature::new(vec![
        article("1", "Smith", "2024"),
        article("2", "Doe", "2023"),
    ]));
    let config = SynthConfig {
        relevance_threshold: 5,
        ..Default::default()
    };

    let result = engine(&llm, &literature, config)
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap();

    let ranked: Vec<(&str, Option<u8>)> = result
        .references
        .iter()
        .map(|r| (r.pmid.as_str(), r.relevance_score))
        .collect();
    assert_eq!(ranked, vec![("2", Some(8)), ("1", Some(5))]);
    assert_eq!(llm.calls(), 3);
}

#[tokio::test]
async fn test_failed_scoring_still_counts_prompt_tokens() {
    let config = SynthConfig {
        relevance_threshold: 5,
        ..Default::default()
    };
    let literature = || {
        Arc::new(MockLiterature::new(vec![
            article("1", "Smith", "2024"),
            article("2", "Doe", "2023"),
        ]))
    };

    let answered = Arc::new(MockLlm::new(["Relevance 5", "8", "Synthesis."]));
    let failed = Arc::new(MockLlm::scripted([
        Reply::Fail("HTTP 503".to_string()),
        Reply::Text("8".to_string()),
        Reply::Text("Synthesis.".to_string()),
    ]));

    let with_answer = engine(&answered, &literature(), config.clone())
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap();
    let with_failure = engine(&failed, &literature(), config)
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap();

    assert_eq!(with_failure.tokens.input, with_answer.tokens.input);
    assert!(with_failure.tokens.output < with_answer.tokens.output);
}

#[tokio::test]
async fn test_score_relevance_reports_prompt_cost() {
    let llm = MockLlm::new(["Relevance: 7/10"]);
    let prompts = PromptSet::builtin().unwrap();
    let paper = article("1", "Smith", "2024");

    let score = score_relevance(
        &llm,
        &prompts,
        "test-model",
        QUESTION,
        &paper,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(score.score, 7);
    assert!(score.parsed);
    let prompt = relevance_prompt(&prompts, QUESTION, &paper).unwrap();
    assert_eq!(score.input_tokens, prompt_tokens(&prompt));
    assert_eq!(llm.requests()[0].max_tokens, Some(10));
}

#[tokio::test]
async fn test_score_relevance_propagates_model_failure() {
    let llm = MockLlm::scripted([Reply::Fail("timeout".to_string())]);
    let prompts = PromptSet::builtin().unwrap();

    let err = score_relevance(
        &llm,
        &prompts,
        "test-model",
        QUESTION,
        &article("1", "Smith", "2024"),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("relevance: timeout"));
}

#[tokio::test]
async fn test_no_documents_found() {
    let llm = Arc::new(MockLlm::new(Vec::<String>::new()));
    let err = engine(&llm, &Arc::new(MockLiterature::empty()), SynthConfig::default())
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoDocumentsFound { ref query } if query == QUESTION));
    assert_eq!(err.kind(), ErrorKind::Policy);
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_nothing_meets_threshold() {
    let llm = Arc::new(MockLlm::new(["2", "3", "6", "1"]));
    let err = engine(&llm, &corpus(), SynthConfig::default())
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BelowRelevanceThreshold { threshold: 7, .. }));
    assert_eq!(err.kind(), ErrorKind::Policy);
    assert_eq!(llm.calls(), 4);
}

#[tokio::test]
async fn test_fetch_failure_names_stage() {
    let llm = Arc::new(MockLlm::new(Vec::<String>::new()));
    let literature = Arc::new(
        MockLiterature::new(vec![article("1", "Smith", "2024")]).failing_fetch("timeout"),
    );

    let err = engine(&llm, &literature, SynthConfig::default())
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("fetch: timeout"));
}

#[tokio::test]
async fn test_compose_failure_is_not_degraded() {
    let llm = Arc::new(MockLlm::scripted([
        Reply::Text("9".to_string()),
        Reply::Fail("context length exceeded".to_string()),
    ]));
    let literature = Arc::new(MockLiterature::new(vec![article("1", "Smith", "2024")]));

    let err = engine(&llm, &literature, SynthConfig::default())
        .synthesize(&CancellationToken::new(), QUESTION)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("synthesis: context length exceeded"));
}

#[tokio::test]
async fn test_cancel_stops_scoring_loop() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let llm = Arc::new(MockLlm::new(["9", "9", "9", "9", "Synthesis."]).on_call(
        move |index, _| {
            if index == 1 {
                trigger.cancel();
            }
        },
    ));

    let err = engine(&llm, &corpus(), SynthConfig::default())
        .synthesize(&token, QUESTION)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Cancelled(ref stage) if stage == "relevance"));
    assert_eq!(llm.calls(), 2);
}

#[tokio::test]
async fn test_cancel_during_compose() {
    let llm = Arc::new(MockLlm::scripted([Reply::Text("9".to_string()), Reply::Hang]));
    let literature = Arc::new(MockLiterature::new(vec![article("1", "Smith", "2024")]));
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = engine(&llm, &literature, SynthConfig::default())
        .synthesize(&token, QUESTION)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Cancelled(ref stage) if stage == "synthesis"));
}

#[tokio::test]
async fn test_empty_question_rejected() {
    let llm = Arc::new(MockLlm::new(Vec::<String>::new()));
    let literature = corpus();
    let err = engine(&llm, &literature, SynthConfig::default())
        .synthesize(&CancellationToken::new(), "  ")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(literature.searches().is_empty());
}

#[tokio::test]
async fn test_deep_dive() {
    let mut paper = article("38012345", "Smith", "2024");
    paper.authors.push(Author::person("Doe", "Ann"));
    paper.authors.push(Author::person("Lee", "Kim"));
    let literature = Arc::new(MockLiterature::new(vec![paper]));
    let llm = Arc::new(MockLlm::new(["\nThis trial found...\n"]));

    let result = engine(&llm, &literature, SynthConfig::default())
        .synthesize_pmid(&CancellationToken::new(), "38012345")
        .await
        .unwrap();

    assert_eq!(result.question, "Deep dive: PMID 38012345");
    assert_eq!(result.synthesis, "This trial found...");
    assert_eq!(
        (result.papers_searched, result.papers_scored, result.papers_used),
        (1, 0, 1)
    );
    assert_eq!(result.references.len(), 1);
    assert_eq!(result.references[0].relevance_score, None);
    assert!(result.ris.contains("AN  - 38012345"));
    assert_eq!(result.tokens.total, result.tokens.input + result.tokens.output);

    let request = &llm.requests()[0];
    assert_eq!(request.max_tokens, Some(500));
    assert!(request.prompt.contains("Cite as (Smith et al., 2024)."));
    assert!(literature.searches().is_empty());
}

#[tokio::test]
async fn test_deep_dive_not_found() {
    let llm = Arc::new(MockLlm::new(Vec::<String>::new()));
    let err = engine(&llm, &corpus(), SynthConfig::default())
        .synthesize_pmid(&CancellationToken::new(), "999")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DocumentNotFound(ref id) if id == "999"));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn test_deep_dive_empty_id() {
    let llm = Arc::new(MockLlm::new(Vec::<String>::new()));
    let literature = corpus();
    let err = engine(&llm, &literature, SynthConfig::default())
        .synthesize_pmid(&CancellationToken::new(), "")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(literature.fetches().is_empty());
}
