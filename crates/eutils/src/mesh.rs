//! MeSH descriptor lookup: esearch then efetch against `db=mesh`.

use crate::client::EutilsClient;
use crate::search::parse_search_response;
use pubmed_core::{AppError, AppResult};
use serde::Serialize;

/// A MeSH descriptor as printed by efetch's full text format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeshRecord {
    pub ui: String,
    pub name: String,
    pub scope_note: String,
    pub tree_numbers: Vec<String>,
    pub entry_terms: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub annotation: String,
}

impl EutilsClient {
    /// Best-matching descriptor for `term`.
    pub async fn mesh_lookup(&self, term: &str) -> AppResult<MeshRecord> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::InvalidInput("MeSH term is empty".to_string()));
        }

        let search = [
            ("db", "mesh".to_string()),
            ("term", term.to_string()),
            ("retmode", "json".to_string()),
        ];
        let found = parse_search_response(&self.get("esearch.fcgi", &search).await?)?;
        let uid = found
            .ids
            .into_iter()
            .next()
            .ok_or_else(|| AppError::TermNotFound(term.to_string()))?;

        let fetch = [
            ("db", "mesh".to_string()),
            ("id", uid.clone()),
            ("rettype", "full".to_string()),
            ("retmode", "text".to_string()),
        ];
        let record = parse_mesh_record(&self.get("efetch.fcgi", &fetch).await?);
        if record.ui.is_empty() && record.name.is_empty() {
            return Err(AppError::Literature(format!(
                "MeSH record {} has no descriptor fields",
                uid
            )));
        }
        tracing::debug!(%term, ui = %record.ui, "MeSH lookup complete");
        Ok(record)
    }
}

/// Parse `KEY = value` lines of a MeSH full-text record. Unknown keys are
/// ignored; ENTRY values keep only the term before the first `|`.
pub fn parse_mesh_record(text: &str) -> MeshRecord {
    let mut record = MeshRecord::default();

    for line in text.lines().map(str::trim) {
        let Some((key, value)) = line.split_once(" = ") else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "MH" => record.name = value.to_string(),
            "UI" => record.ui = value.to_string(),
            "MS" => record.scope_note = value.to_string(),
            "MN" => record.tree_numbers.push(value.to_string()),
            "AN" => record.annotation = value.to_string(),
            "ENTRY" | "PRINT ENTRY" => {
                let entry = value.split('|').next().unwrap_or(value).trim();
                if !entry.is_empty() {
                    record.entry_terms.push(entry.to_string());
                }
            }
            _ => {}
        }
    }

    record
}
