//! elink: citation and similarity neighbours of one PMID.

use crate::client::EutilsClient;
use pubmed_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which PubMed-to-PubMed link set to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Articles citing the source
    CitedBy,
    /// Articles the source cites
    References,
    /// Similar articles, scored by NCBI
    Related,
}

impl LinkKind {
    pub fn linkname(&self) -> &'static str {
        match self {
            LinkKind::CitedBy => "pubmed_pubmed_citedin",
            LinkKind::References => "pubmed_pubmed_refs",
            LinkKind::Related => "pubmed_pubmed",
        }
    }

    fn command(&self) -> &'static str {
        match self {
            LinkKind::Related => "neighbor_score",
            LinkKind::CitedBy | LinkKind::References => "neighbor",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LinkKind::CitedBy => "cited by",
            LinkKind::References => "references",
            LinkKind::Related => "related",
        };
        f.write_str(label)
    }
}

/// One linked article. `score` is only set for [`LinkKind::Related`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkResult {
    pub source_id: String,
    pub kind: LinkKind,
    pub links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct LinkEnvelope {
    #[serde(default)]
    linksets: Vec<LinkSet>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkSet {
    #[serde(default)]
    linksetdbs: Vec<LinkSetDb>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkSetDb {
    #[serde(default)]
    linkname: String,
    #[serde(default)]
    links: Vec<RawLink>,
}

/// Plain links are bare ids; `neighbor_score` links are objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLink {
    Id(String),
    Scored { id: NumberOrString, score: Option<NumberOrString> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s,
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl EutilsClient {
    pub async fn cited_by(&self, pmid: &str) -> AppResult<LinkResult> {
        self.elink(LinkKind::CitedBy, pmid).await
    }

    pub async fn references(&self, pmid: &str) -> AppResult<LinkResult> {
        self.elink(LinkKind::References, pmid).await
    }

    pub async fn related(&self, pmid: &str) -> AppResult<LinkResult> {
        self.elink(LinkKind::Related, pmid).await
    }

    /// Follow the `kind` link set from `pmid`.
    pub async fn elink(&self, kind: LinkKind, pmid: &str) -> AppResult<LinkResult> {
        let pmid = pmid.trim();
        if pmid.is_empty() {
            return Err(AppError::InvalidInput("PMID is empty".to_string()));
        }

        let body = self.get("elink.fcgi", &link_params(kind, pmid)).await?;
        let result = parse_link_response(&body, kind, pmid)?;
        tracing::debug!(%pmid, %kind, links = result.links.len(), "elink complete");
        Ok(result)
    }
}

fn link_params(kind: LinkKind, pmid: &str) -> Vec<(&'static str, String)> {
    vec![
        ("dbfrom", "pubmed".to_string()),
        ("db", "pubmed".to_string()),
        ("id", pmid.to_string()),
        ("linkname", kind.linkname().to_string()),
        ("cmd", kind.command().to_string()),
        ("retmode", "json".to_string()),
    ]
}

/// Parse an elink JSON body. Only link sets named for `kind` are read, and
/// the source article is dropped from its own neighbours.
pub fn parse_link_response(body: &str, kind: LinkKind, source_id: &str) -> AppResult<LinkResult> {
    let envelope: LinkEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::Literature(format!("parsing link response: {}", e)))?;

    if let Some(error) = envelope.error {
        return Err(AppError::Literature(format!("NCBI link error: {}", error)));
    }

    let mut links = Vec::new();
    for set in envelope.linksets {
        if let Some(error) = set.error {
            return Err(AppError::Literature(format!("NCBI link error: {}", error)));
        }
        for db in set.linksetdbs.into_iter().filter(|db| db.linkname == kind.linkname()) {
            for raw in db.links {
                let link = match raw {
                    RawLink::Id(id) => Link { id, score: None },
                    RawLink::Scored { id, score } => Link {
                        score: score.as_ref().and_then(NumberOrString::as_u64),
                        id: id.into_string(),
                    },
                };
                if link.id != source_id {
                    links.push(link);
                }
            }
        }
    }

    Ok(LinkResult {
        source_id: source_id.to_string(),
        kind,
        links,
    })
}
