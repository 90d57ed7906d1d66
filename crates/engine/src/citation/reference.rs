//! The citable form of an article.

use super::apa::format_apa;
use pubmed_eutils::{Article, Author};
use serde::Serialize;

/// A ranked, citable article. Built once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    /// "Smith 2024"
    pub key: String,
    /// 1-based position in the final ranking
    pub rank: usize,
    pub pmid: String,
    pub citation_apa: String,
    /// None for references that were not scored (deep dive, `cite`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<u8>,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// Display form: "Smith J", "Smith J & Doe A" or "Smith J et al."
    pub authors: String,
    /// Every author as "Last, Fore"
    pub author_list: Vec<String>,
    pub year: String,
    pub journal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    /// PubMed Central id when free full text exists: "PMC10000001"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmcid: Option<String>,
}

impl Reference {
    pub fn from_article(article: &Article, rank: usize, relevance_score: Option<u8>) -> Self {
        let key = match article.authors.first() {
            Some(first) => format!("{} {}", surname_token(first), article.year),
            None => rank.to_string(),
        };

        Self {
            key,
            rank,
            pmid: article.pmid.clone(),
            citation_apa: format_apa(article),
            relevance_score,
            title: article.title.clone(),
            abstract_text: article.abstract_text.clone(),
            authors: display_authors(&article.authors),
            author_list: article.authors.iter().map(Author::inverted_name).collect(),
            year: article.year.clone(),
            journal: article.journal.clone(),
            doi: article.doi.clone(),
            pmcid: article.pmcid.clone(),
        }
    }
}

/// Author-year key used inline: "Smith, 2024", "Smith & Doe, 2024" or
/// "Smith et al., 2024".
pub fn in_text_citation(article: &Article) -> String {
    let year = match article.year.trim() {
        "" => "n.d.",
        year => year,
    };
    let names = match article.authors.as_slice() {
        [] => "Unknown".to_string(),
        [only] => surname_token(only).to_string(),
        [first, second] => format!("{} & {}", surname_token(first), surname_token(second)),
        [first, ..] => format!("{} et al.", surname_token(first)),
    };
    format!("{}, {}", names, year)
}

fn display_authors(authors: &[Author]) -> String {
    match authors {
        [] => String::new(),
        [only] => only.display_name(),
        [first, second] => format!("{} & {}", first.display_name(), second.display_name()),
        [first, ..] => format!("{} et al.", first.display_name()),
    }
}

fn surname_token(author: &Author) -> &str {
    match author.surname().trim() {
        "" => "Unknown",
        surname => surname,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(authors: Vec<Author>) -> Article {
        Article {
            pmid: "38012345".to_string(),
            title: "Trial".to_string(),
            authors,
            year: "2024".to_string(),
            journal: "NEJM".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_article() {
        let reference = Reference::from_article(
            &article(vec![
                Author::person("Smith", "John"),
                Author::person("Doe", "Ann"),
                Author::person("Lee", "Kim"),
            ]),
            2,
            Some(8),
        );

        assert_eq!(reference.key, "Smith 2024");
        assert_eq!(reference.rank, 2);
        assert_eq!(reference.authors, "Smith J et al.");
        assert_eq!(reference.author_list, vec!["Smith, John", "Doe, Ann", "Lee, Kim"]);
        assert_eq!(reference.relevance_score, Some(8));
        assert!(reference.citation_apa.starts_with("Smith, J., Doe, A., & Lee, K. (2024)."));
    }

    #[test]
    fn test_display_authors() {
        let two = Reference::from_article(
            &article(vec![Author::person("Smith", "John"), Author::collective("WHO")]),
            1,
            None,
        );
        assert_eq!(two.authors, "Smith J & WHO");

        let none = Reference::from_article(&article(vec![]), 3, None);
        assert_eq!(none.authors, "");
        assert_eq!(none.key, "3");
    }

    #[test]
    fn test_in_text_citation() {
        assert_eq!(in_text_citation(&article(vec![])), "Unknown, 2024");
        assert_eq!(
            in_text_citation(&article(vec![Author::person("Smith", "J")])),
            "Smith, 2024"
        );
        assert_eq!(
            in_text_citation(&article(vec![
                Author::person("Smith", "J"),
                Author::person("Doe", "A"),
            ])),
            "Smith & Doe, 2024"
        );

        let mut undated = article(vec![
            Author::person("Smith", "J"),
            Author::person("Doe", "A"),
            Author::person("Lee", "K"),
        ]);
        undated.year.clear();
        assert_eq!(in_text_citation(&undated), "Smith et al., n.d.");
    }

    #[test]
    fn test_serializes_abstract_field() {
        let reference = Reference::from_article(&article(vec![]), 1, None);
        let json = serde_json::to_value(&reference).unwrap();
        assert!(json.get("abstract").is_some());
        assert!(json.get("relevance_score").is_none());
    }
}
