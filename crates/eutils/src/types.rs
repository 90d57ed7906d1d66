//! Bibliographic records returned by the literature service.

use serde::{Deserialize, Serialize};

/// One PubMed record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub pmid: String,
    pub title: String,
    /// Full abstract; labelled sections rendered `LABEL: text`, joined by blank lines
    pub abstract_text: String,
    /// Authors in byline order
    pub authors: Vec<Author>,
    /// Publication year as printed, usually four digits; may be empty
    pub year: String,
    pub journal: String,
    pub doi: Option<String>,
    pub pmcid: Option<String>,
}

/// A byline entry: a person or a group/consortium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Author {
    Person {
        last_name: String,
        fore_name: String,
        /// As supplied by PubMed ("JA"); empty when absent
        #[serde(default)]
        initials: String,
    },
    Collective {
        name: String,
    },
}

impl Author {
    /// Person with initials derived from the forename.
    pub fn person(last_name: impl Into<String>, fore_name: impl Into<String>) -> Self {
        let fore_name = fore_name.into();
        let initials = compact_initials(&fore_name);
        Author::Person {
            last_name: last_name.into(),
            fore_name,
            initials,
        }
    }

    /// Group author such as "COVID-19 Genomics Consortium".
    pub fn collective(name: impl Into<String>) -> Self {
        Author::Collective { name: name.into() }
    }

    /// Family name, or the group name for collectives.
    pub fn surname(&self) -> &str {
        match self {
            Author::Person { last_name, .. } => last_name,
            Author::Collective { name } => name,
        }
    }

    /// PubMed display form: "Smith JA", or the group name.
    pub fn display_name(&self) -> String {
        match self {
            Author::Person {
                last_name,
                fore_name,
                initials,
            } => {
                let initials = if initials.is_empty() {
                    compact_initials(fore_name)
                } else {
                    initials.clone()
                };
                if initials.is_empty() {
                    last_name.clone()
                } else {
                    format!("{} {}", last_name, initials)
                }
            }
            Author::Collective { name } => name.clone(),
        }
    }

    /// Reference-manager form: "Smith, John A", or the group name.
    pub fn inverted_name(&self) -> String {
        match self {
            Author::Person {
                last_name,
                fore_name,
                ..
            } if !fore_name.trim().is_empty() => format!("{}, {}", last_name, fore_name.trim()),
            Author::Person { last_name, .. } => last_name.clone(),
            Author::Collective { name } => name.clone(),
        }
    }

    /// APA initials: "J. A." for "John Andrew"; empty when unknown.
    pub fn apa_initials(&self) -> String {
        match self {
            Author::Person {
                fore_name,
                initials,
                ..
            } => {
                let letters: Vec<String> = if fore_name.trim().is_empty() {
                    initials.chars().map(|c| c.to_string()).collect()
                } else {
                    fore_name
                        .split_whitespace()
                        .filter_map(|part| part.chars().next())
                        .map(|c| c.to_string())
                        .collect()
                };
                letters
                    .iter()
                    .map(|l| format!("{}.", l))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            Author::Collective { .. } => String::new(),
        }
    }
}

fn compact_initials(fore_name: &str) -> String {
    fore_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .collect()
}

/// Result of a search: total hits and the ordered identifiers returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub count: u64,
    pub ids: Vec<String>,
}
