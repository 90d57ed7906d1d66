//! efetch: PMIDs to full records.
//!
//! The PubMed XML is walked as an event stream with a stack of open element
//! names. Text is routed by the stack suffix, which keeps PMIDs from
//! `CommentsCorrections` and DOIs from `ReferenceList` out of the record.

use crate::client::EutilsClient;
use crate::types::{Article, Author};
use pubmed_core::{AppError, AppResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::sync::LazyLock;

static YEAR: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\d{4}").ok());

impl EutilsClient {
    /// Run efetch for `ids` and parse the records.
    pub async fn efetch(&self, ids: &[String]) -> AppResult<Vec<Article>> {
        if ids.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one PMID is required".to_string(),
            ));
        }

        let params = [
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("rettype", "xml".to_string()),
            ("retmode", "xml".to_string()),
        ];

        let body = self.get("efetch.fcgi", &params).await?;
        let articles = parse_articles(&body)?;
        tracing::debug!(requested = ids.len(), parsed = articles.len(), "efetch complete");
        Ok(articles)
    }
}

/// Parse a `PubmedArticleSet` document.
pub fn parse_articles(xml: &str) -> AppResult<Vec<Article>> {
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut parser = ArticleSetParser::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                path.push(element_name(&e));
                parser.start(&path, &e);
            }
            Ok(Event::Empty(e)) => {
                path.push(element_name(&e));
                parser.start(&path, &e);
                parser.end(&path);
                path.pop();
            }
            Ok(Event::End(_)) => {
                parser.end(&path);
                path.pop();
            }
            Ok(Event::Text(t)) => {
                let text = match t.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(_) => String::from_utf8_lossy(&t).into_owned(),
                };
                parser.text(&path, &text);
            }
            Ok(Event::CData(c)) => parser.text(&path, &String::from_utf8_lossy(&c)),
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(AppError::Literature(format!(
                    "parsing PubMed XML at byte {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(parser.articles)
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn ends_with(path: &[String], suffix: &[&str]) -> bool {
    path.len() >= suffix.len()
        && path[path.len() - suffix.len()..]
            .iter()
            .zip(suffix)
            .all(|(a, b)| a == b)
}

fn within(path: &[String], name: &str) -> bool {
    path.iter().any(|p| p == name)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Default)]
struct ArticleSetParser {
    articles: Vec<Article>,
    current: Option<PartialArticle>,
}

#[derive(Default)]
struct PartialArticle {
    pmid: String,
    title: String,
    sections: Vec<(Option<String>, String)>,
    journal: String,
    year: String,
    medline_date: String,
    authors: Vec<Author>,
    author: Option<PartialAuthor>,
    article_id_type: Option<String>,
    article_id: String,
    elocation_type: Option<String>,
    elocation: String,
    doi: Option<String>,
    elocation_doi: Option<String>,
    pmcid: Option<String>,
}

#[derive(Default)]
struct PartialAuthor {
    valid: bool,
    last_name: String,
    fore_name: String,
    initials: String,
    collective: String,
}

impl ArticleSetParser {
    fn start(&mut self, path: &[String], e: &BytesStart) {
        if ends_with(path, &["PubmedArticle"]) {
            self.current = Some(PartialArticle::default());
            return;
        }
        let Some(cur) = self.current.as_mut() else {
            return;
        };

        if ends_with(path, &["Abstract", "AbstractText"]) {
            cur.sections.push((attribute(e, "Label"), String::new()));
        } else if ends_with(path, &["AuthorList", "Author"]) {
            cur.author = Some(PartialAuthor {
                valid: attribute(e, "ValidYN").as_deref() != Some("N"),
                ..PartialAuthor::default()
            });
        } else if ends_with(path, &["PubmedData", "ArticleIdList", "ArticleId"]) {
            cur.article_id_type = attribute(e, "IdType");
            cur.article_id.clear();
        } else if ends_with(path, &["Article", "ELocationID"]) {
            cur.elocation_type = attribute(e, "EIdType");
            cur.elocation.clear();
        }
    }

    fn text(&mut self, path: &[String], text: &str) {
        let Some(cur) = self.current.as_mut() else {
            return;
        };

        if ends_with(path, &["MedlineCitation", "PMID"]) {
            cur.pmid.push_str(text);
        } else if within(path, "ArticleTitle") {
            cur.title.push_str(text);
        } else if within(path, "Abstract") && within(path, "AbstractText") {
            if let Some((_, section)) = cur.sections.last_mut() {
                section.push_str(text);
            }
        } else if ends_with(path, &["Journal", "Title"]) {
            cur.journal.push_str(text);
        } else if ends_with(path, &["PubDate", "Year"]) {
            cur.year.push_str(text);
        } else if ends_with(path, &["PubDate", "MedlineDate"]) {
            cur.medline_date.push_str(text);
        } else if ends_with(path, &["PubmedData", "ArticleIdList", "ArticleId"]) {
            cur.article_id.push_str(text);
        } else if ends_with(path, &["Article", "ELocationID"]) {
            cur.elocation.push_str(text);
        } else if let Some(author) = cur.author.as_mut() {
            let field = path
                .iter()
                .rposition(|p| p == "Author")
                .and_then(|pos| path.get(pos + 1))
                .map(String::as_str);
            match field {
                Some("LastName") => author.last_name.push_str(text),
                Some("ForeName") => author.fore_name.push_str(text),
                Some("Initials") => author.initials.push_str(text),
                Some("CollectiveName") => author.collective.push_str(text),
                _ => {}
            }
        }
    }

    fn end(&mut self, path: &[String]) {
        if ends_with(path, &["PubmedArticle"]) {
            if let Some(partial) = self.current.take() {
                self.articles.push(partial.finish());
            }
            return;
        }
        let Some(cur) = self.current.as_mut() else {
            return;
        };

        if ends_with(path, &["AuthorList", "Author"]) {
            if let Some(author) = cur.author.take().and_then(PartialAuthor::finish) {
                cur.authors.push(author);
            }
        } else if ends_with(path, &["PubmedData", "ArticleIdList", "ArticleId"]) {
            let value = cur.article_id.trim().to_string();
            if !value.is_empty() {
                match cur.article_id_type.as_deref() {
                    Some("doi") => cur.doi = Some(value),
                    Some("pmc") => cur.pmcid = Some(value),
                    _ => {}
                }
            }
        } else if ends_with(path, &["Article", "ELocationID"]) {
            let value = cur.elocation.trim().to_string();
            if cur.elocation_type.as_deref() == Some("doi") && !value.is_empty() {
                cur.elocation_doi = Some(value);
            }
        }
    }
}

impl PartialAuthor {
    fn finish(self) -> Option<Author> {
        if !self.valid {
            return None;
        }
        let collective = normalize_whitespace(&self.collective);
        if !collective.is_empty() {
            return Some(Author::collective(collective));
        }
        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            return None;
        }
        Some(Author::Person {
            last_name: last_name.to_string(),
            fore_name: self.fore_name.trim().to_string(),
            initials: self.initials.trim().to_string(),
        })
    }
}

impl PartialArticle {
    fn finish(self) -> Article {
        let abstract_text = self
            .sections
            .iter()
            .filter_map(|(label, text)| {
                let text = normalize_whitespace(text);
                if text.is_empty() {
                    return None;
                }
                Some(match label.as_deref().map(str::trim) {
                    Some(label) if !label.is_empty() => format!("{}: {}", label, text),
                    _ => text,
                })
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let year = if !self.year.trim().is_empty() {
            self.year.trim().to_string()
        } else {
            YEAR.as_ref()
                .and_then(|re| re.find(&self.medline_date))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()
        };

        Article {
            pmid: self.pmid.trim().to_string(),
            title: normalize_whitespace(&self.title),
            abstract_text,
            authors: self.authors,
            year,
            journal: normalize_whitespace(&self.journal),
            doi: self.doi.or(self.elocation_doi),
            pmcid: self.pmcid,
        }
    }
}
