//! Bibliographic search/fetch for the PubMed assistant.
//!
//! The engine depends only on [`LiteratureSource`]. [`EutilsClient`] is the
//! production implementation backed by NCBI E-utilities (esearch + efetch),
//! and also follows citation links (elink) and looks up MeSH descriptors.

pub mod client;
pub mod fetch;
pub mod link;
pub mod mesh;
pub mod search;
pub mod types;

pub use client::EutilsClient;
pub use fetch::parse_articles;
pub use link::{parse_link_response, Link, LinkKind, LinkResult};
pub use mesh::{parse_mesh_record, MeshRecord};
pub use search::parse_search_response;
pub use types::{Article, Author, SearchResult};

use pubmed_core::AppResult;

/// Search and fetch bibliographic records.
///
/// Implementations are responsible for their own transport concerns (rate
/// limiting, retries). Futures must be cancel-safe: the engine drops them
/// when the caller cancels.
#[async_trait::async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Identifiers for `query`, best match first, at most `limit` of them.
    async fn search(&self, query: &str, limit: usize) -> AppResult<SearchResult>;

    /// Full records for `ids`. Fails on an empty id list.
    async fn fetch(&self, ids: &[String]) -> AppResult<Vec<Article>>;
}
