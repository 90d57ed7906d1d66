//! APA-style reference strings.

use pubmed_eutils::{Article, Author};

/// Authors listed in full before the list is elided.
const MAX_LISTED_AUTHORS: usize = 7;
/// Authors kept ahead of the ellipsis when the list is elided.
const LEADING_AUTHORS_WHEN_ELIDED: usize = 6;

/// `Authors (Year). Title. Journal.` with a DOI link when one is known.
pub fn format_apa(article: &Article) -> String {
    let year = match article.year.trim() {
        "" => "n.d.",
        year => year,
    };
    let title = article.title.trim().trim_end_matches('.');

    let mut citation = format!(
        "{} ({}). {}. {}.",
        apa_authors(&article.authors),
        year,
        title,
        article.journal.trim().trim_end_matches('.')
    );
    if let Some(doi) = article.doi.as_deref().filter(|d| !d.trim().is_empty()) {
        citation.push_str(" https://doi.org/");
        citation.push_str(doi.trim());
    }
    citation
}

/// APA author list: "Smith, J.", "Smith, J. & Doe, A.", "A, B, & C", or the
/// first six, an ellipsis and the last author.
pub fn apa_authors(authors: &[Author]) -> String {
    let names: Vec<String> = authors.iter().map(apa_author).collect();

    match names.as_slice() {
        [] => "Unknown".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} & {}", first, second),
        [leading @ .., last] if names.len() <= MAX_LISTED_AUTHORS => {
            format!("{}, & {}", leading.join(", "), last)
        }
        [.., last] => format!(
            "{}, ..., & {}",
            names[..LEADING_AUTHORS_WHEN_ELIDED].join(", "),
            last
        ),
    }
}

fn apa_author(author: &Author) -> String {
    match author {
        Author::Collective { name } => name.clone(),
        Author::Person { last_name, .. } => {
            let initials = author.apa_initials();
            if initials.is_empty() {
                last_name.clone()
            } else {
                format!("{}, {}", last_name, initials)
            }
        }
    }
}
