//! esearch: query to ordered PMIDs.

use crate::client::EutilsClient;
use crate::types::SearchResult;
use pubmed_core::{AppError, AppResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    esearchresult: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    count: Option<String>,
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
}

impl EutilsClient {
    /// Run esearch against PubMed, best match first.
    pub async fn esearch(&self, query: &str, limit: usize) -> AppResult<SearchResult> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("search query is empty".to_string()));
        }

        let params = [
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", limit.to_string()),
            ("sort", "relevance".to_string()),
        ];

        let body = self.get("esearch.fcgi", &params).await?;
        let result = parse_search_response(&body)?;
        tracing::debug!(count = result.count, returned = result.ids.len(), "esearch complete");
        Ok(result)
    }
}

/// Parse an esearch JSON body.
pub fn parse_search_response(body: &str) -> AppResult<SearchResult> {
    let envelope: SearchEnvelope = serde_json::from_str(body)
        .map_err(|e| AppError::Literature(format!("parsing search response: {}", e)))?;
    let SearchBody {
        count,
        idlist,
        error,
    } = envelope.esearchresult;

    if let Some(error) = error {
        return Err(AppError::Literature(format!("NCBI search error: {}", error)));
    }

    let count = count
        .and_then(|c| c.trim().parse::<u64>().ok())
        .unwrap_or(idlist.len() as u64);

    Ok(SearchResult { count, ids: idlist })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_search_response() {
        let body = r#"{"header":{"type":"esearch"},"esearchresult":{"count":"1523","retmax":"2","idlist":["38012345","37999999"]}}"#;
        let result = parse_search_response(body).unwrap();
        assert_eq!(result.count, 1523);
        assert_eq!(result.ids, vec!["38012345", "37999999"]);
    }

    #[test]
    fn test_parse_empty_result() {
        let body = r#"{"esearchresult":{"count":"0","idlist":[]}}"#;
        let result = parse_search_response(body).unwrap();
        assert_eq!(result, SearchResult::default());
    }

    #[test]
    fn test_parse_missing_count_uses_list_length() {
        let body = r#"{"esearchresult":{"idlist":["1","2","3"]}}"#;
        assert_eq!(parse_search_response(body).unwrap().count, 3);
    }

    #[test]
    fn test_parse_error_field() {
        let body = r#"{"esearchresult":{"ERROR":"Invalid query syntax"}}"#;
        let err = parse_search_response(body).unwrap_err();
        assert!(err.to_string().contains("Invalid query syntax"));
    }

    #[test]
    fn test_parse_malformed_body() {
        let err = parse_search_response("<html>502</html>").unwrap_err();
        assert!(matches!(err, AppError::Literature(_)));
    }
}
