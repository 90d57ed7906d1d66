//! In-memory collaborators for engine flow tests.

use pubmed_core::{AppError, AppResult};
use pubmed_eutils::{Article, Author, LiteratureSource, SearchResult};
use pubmed_llm::{LlmClient, LlmRequest, LlmResponse};
use std::collections::VecDeque;
use std::sync::Mutex;

/// What the mock model does for one call.
pub enum Reply {
    Text(String),
    Fail(String),
    /// Fails with an arbitrary error, e.g. from a process-backed client
    Error(AppError),
    /// Never completes
    Hang,
}

type CallHook = Box<dyn Fn(usize, &LlmRequest) + Send + Sync>;

/// Replies from a script, then a fixed fallback. Records every request.
pub struct MockLlm {
    script: Mutex<VecDeque<Reply>>,
    fallback: String,
    requests: Mutex<Vec<LlmRequest>>,
    on_call: Option<CallHook>,
}

impl MockLlm {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(replies.into_iter().map(|r| Reply::Text(r.into())))
    }

    pub fn scripted(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into_iter().collect()),
            fallback: "CONFIDENCE: 5\nANSWER: no".to_string(),
            requests: Mutex::new(Vec::new()),
            on_call: None,
        }
    }

    /// Run `hook` with the zero-based call index before replying.
    pub fn on_call(mut self, hook: impl Fn(usize, &LlmRequest) + Send + Sync + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.prompt).collect()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlm {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        if let Some(hook) = &self.on_call {
            hook(index, request);
        }

        let reply = self.script.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(LlmResponse::text(text, &request.model)),
            Some(Reply::Fail(message)) => Err(AppError::Llm(message)),
            Some(Reply::Error(err)) => Err(err),
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(LlmResponse::text(self.fallback.clone(), &request.model)),
        }
    }
}

/// A fixed corpus. Search returns corpus ids in order; fetch returns the
/// requested ids that exist, in request order.
#[derive(Default)]
pub struct MockLiterature {
    corpus: Vec<Article>,
    search_error: Option<String>,
    fetch_error: Option<String>,
    searches: Mutex<Vec<(String, usize)>>,
    fetches: Mutex<Vec<Vec<String>>>,
}

impl MockLiterature {
    pub fn new(corpus: Vec<Article>) -> Self {
        Self {
            corpus,
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing_search(mut self, message: &str) -> Self {
        self.search_error = Some(message.to_string());
        self
    }

    pub fn failing_fetch(mut self, message: &str) -> Self {
        self.fetch_error = Some(message.to_string());
        self
    }

    /// `(query, limit)` of every search.
    pub fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> Vec<Vec<String>> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LiteratureSource for MockLiterature {
    async fn search(&self, query: &str, limit: usize) -> AppResult<SearchResult> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), limit));
        if let Some(message) = &self.search_error {
            return Err(AppError::Literature(message.clone()));
        }

        let ids: Vec<String> = self
            .corpus
            .iter()
            .take(limit)
            .map(|a| a.pmid.clone())
            .collect();
        Ok(SearchResult {
            count: self.corpus.len() as u64,
            ids,
        })
    }

    async fn fetch(&self, ids: &[String]) -> AppResult<Vec<Article>> {
        self.fetches.lock().unwrap().push(ids.to_vec());
        if let Some(message) = &self.fetch_error {
            return Err(AppError::Literature(message.clone()));
        }
        if ids.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one PMID is required".to_string(),
            ));
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.corpus.iter().find(|a| &a.pmid == id).cloned())
            .collect())
    }
}

/// An article by a single author.
pub fn article(pmid: &str, surname: &str, year: &str) -> Article {
    Article {
        pmid: pmid.to_string(),
        title: format!("Study {}", pmid),
        abstract_text: format!(
            "RESULTS: Treatment {} reduced symptoms by 30% (p<0.01). CONCLUSIONS: Effective.",
            pmid
        ),
        authors: vec![Author::person(surname, "Alex")],
        year: year.to_string(),
        journal: "Journal of Tests".to_string(),
        doi: Some(format!("10.1000/{}", pmid)),
        pmcid: None,
    }
}
