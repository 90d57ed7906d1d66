//! Rendering and file export for command results.

use pubmed_core::{AppError, AppResult};
use pubmed_engine::{generate_bibtex, generate_ris, AnswerResult, Reference, Strategy, SynthesisResult};
use pubmed_eutils::{LinkKind, LinkResult, MeshRecord};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

/// Evidence longer than this is left out of `--explain` output.
const MAX_EXPLAINED_CONTEXT_CHARS: usize = 500;

pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let text = serde_json::to_string_pretty(value)?;
    println!("{}", text);
    Ok(())
}

/// Markdown report for a synthesis: header, synthesis, numbered references
/// and the approximate token footer.
pub fn render_markdown(result: &SynthesisResult) -> String {
    let mut out = String::new();
    let _ = write!(out, "# {}\n\n", result.question);
    let _ = write!(
        out,
        "*Searched {} papers, scored {}, used {}*\n\n",
        result.papers_searched, result.papers_scored, result.papers_used
    );
    let _ = write!(out, "## Synthesis\n\n{}\n\n", result.synthesis);

    out.push_str("## References\n\n");
    for reference in &result.references {
        let _ = write!(out, "{}. {}", reference.rank, reference.citation_apa);
        if let Some(score) = reference.relevance_score {
            let _ = write!(out, " (relevance: {}/10)", score);
        }
        let _ = writeln!(out, " [PMID: {}]", reference.pmid);
    }

    let _ = write!(
        out,
        "\n---\n*Tokens: ~{} input, ~{} output, ~{} total*\n",
        result.tokens.input, result.tokens.output, result.tokens.total
    );
    out
}

/// Human-readable QA result for `--explain`.
pub fn format_explained(result: &AnswerResult) -> String {
    let icon = match result.strategy {
        Strategy::Parametric => "🧠",
        Strategy::Retrieval => "🔍",
    };

    let mut out = String::new();
    let _ = writeln!(out, "\n{} Answer: {}", icon, result.answer.to_uppercase());
    let _ = writeln!(out, "   Strategy: {}", result.strategy);
    if result.novel {
        out.push_str("   Novel knowledge detected: yes\n");
    }
    if result.confidence > 0 {
        let _ = writeln!(out, "   Confidence: {}/10", result.confidence);
    }
    if !result.sources.is_empty() {
        let _ = writeln!(out, "   Sources: {}", result.sources.join(", "));
    }
    if !result.context.is_empty() && result.context.chars().count() < MAX_EXPLAINED_CONTEXT_CHARS {
        out.push_str("\n   Context:\n");
        for line in result.context.lines() {
            let _ = writeln!(out, "   {}", line);
        }
    }
    out
}

/// Link listing: a header with the count, then one id per line.
pub fn format_links(result: &LinkResult) -> String {
    let heading = match result.kind {
        LinkKind::CitedBy => "Articles citing",
        LinkKind::References => "References of",
        LinkKind::Related => "Articles related to",
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} PMID {} ({})",
        heading,
        result.source_id,
        result.links.len()
    );
    for link in &result.links {
        match link.score {
            Some(score) => {
                let _ = writeln!(out, "  {}  score {}", link.id, score);
            }
            None => {
                let _ = writeln!(out, "  {}", link.id);
            }
        }
    }
    out
}

pub fn format_mesh(record: &MeshRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", record.name, record.ui);
    if !record.tree_numbers.is_empty() {
        let _ = writeln!(out, "Tree numbers: {}", record.tree_numbers.join(", "));
    }
    if !record.entry_terms.is_empty() {
        let _ = writeln!(out, "Entry terms: {}", record.entry_terms.join(", "));
    }
    if !record.scope_note.is_empty() {
        let _ = write!(out, "\n{}\n", record.scope_note);
    }
    if !record.annotation.is_empty() {
        let _ = write!(out, "\nAnnotation: {}\n", record.annotation);
    }
    out
}

pub fn write_ris_file(path: &Path, references: &[Reference]) -> AppResult<()> {
    write_export(path, &generate_ris(references))
}

pub fn write_bibtex_file(path: &Path, references: &[Reference]) -> AppResult<()> {
    write_export(path, &generate_bibtex(references))
}

fn write_export(path: &Path, contents: &str) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| with_path(e, "create", parent))?;
    }
    fs::write(path, contents).map_err(|e| with_path(e, "write", path))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote export");
    Ok(())
}

fn with_path(err: io::Error, action: &str, path: &Path) -> AppError {
    AppError::Io(io::Error::new(
        err.kind(),
        format!("Failed to {} {}: {}", action, path.display(), err),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pubmed_engine::TokenUsage;
    use pubmed_eutils::Link;

    fn reference(rank: usize, pmid: &str, score: Option<u8>) -> Reference {
        Reference {
            key: format!("Smith 202{}", rank),
            rank,
            pmid: pmid.to_string(),
            citation_apa: format!("Smith, J. (202{}). Title {}. Journal.", rank, rank),
            relevance_score: score,
            title: format!("Title {}", rank),
            abstract_text: "Abstract.".to_string(),
            authors: "John Smith".to_string(),
            author_list: vec!["Smith, John".to_string()],
            year: format!("202{}", rank),
            journal: "Journal".to_string(),
            doi: None,
            pmcid: None,
        }
    }

    fn synthesis(references: Vec<Reference>) -> SynthesisResult {
        SynthesisResult {
            question: "Does exercise help?".to_string(),
            synthesis: "Yes, modestly [1].".to_string(),
            papers_searched: 20,
            papers_scored: 20,
            papers_used: references.len(),
            references,
            ris: String::new(),
            tokens: TokenUsage::new(1000, 250),
        }
    }

    fn answer(strategy: Strategy) -> AnswerResult {
        AnswerResult {
            question: "Does X work?".to_string(),
            answer: "yes".to_string(),
            confidence: 8,
            strategy,
            novel: false,
            sources: Vec::new(),
            context: String::new(),
        }
    }

    #[test]
    fn test_render_markdown_layout() {
        let rendered = render_markdown(&synthesis(vec![
            reference(1, "111", Some(9)),
            reference(2, "222", None),
        ]));

        let expected = "# Does exercise help?\n\n\
            *Searched 20 papers, scored 20, used 2*\n\n\
            ## Synthesis\n\nYes, modestly [1].\n\n\
            ## References\n\n\
            1. Smith, J. (2021). Title 1. Journal. (relevance: 9/10) [PMID: 111]\n\
            2. Smith, J. (2022). Title 2. Journal. [PMID: 222]\n\
            \n---\n*Tokens: ~1000 input, ~250 output, ~1250 total*\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_format_explained_parametric() {
        let out = format_explained(&answer(Strategy::Parametric));
        assert!(out.starts_with("\n🧠 Answer: YES\n"));
        assert!(out.contains("   Strategy: parametric\n"));
        assert!(out.contains("   Confidence: 8/10\n"));
        assert!(!out.contains("Sources"));
        assert!(!out.contains("Novel"));
    }

    #[test]
    fn test_format_explained_retrieval_with_context() {
        let mut result = answer(Strategy::Retrieval);
        result.confidence = 0;
        result.novel = true;
        result.sources = vec!["111".to_string(), "222".to_string()];
        result.context = "[PMID 111] Title\nShort evidence.".to_string();

        let out = format_explained(&result);
        assert!(out.starts_with("\n🔍 Answer: YES\n"));
        assert!(out.contains("   Novel knowledge detected: yes\n"));
        assert!(!out.contains("Confidence"));
        assert!(out.contains("   Sources: 111, 222\n"));
        assert!(out.contains("\n   Context:\n   [PMID 111] Title\n   Short evidence.\n"));
    }

    #[test]
    fn test_format_explained_omits_long_context() {
        let mut result = answer(Strategy::Retrieval);
        result.context = "x".repeat(MAX_EXPLAINED_CONTEXT_CHARS);
        assert!(!format_explained(&result).contains("Context"));
    }

    #[test]
    fn test_format_links() {
        let result = LinkResult {
            source_id: "38123456".to_string(),
            kind: LinkKind::CitedBy,
            links: vec![
                Link { id: "39000001".to_string(), score: None },
                Link { id: "39000002".to_string(), score: None },
            ],
        };
        assert_eq!(
            format_links(&result),
            "Articles citing PMID 38123456 (2)\n  39000001\n  39000002\n"
        );

        let related = LinkResult {
            source_id: "1".to_string(),
            kind: LinkKind::Related,
            links: vec![Link { id: "2".to_string(), score: Some(98765432) }],
        };
        assert_eq!(
            format_links(&related),
            "Articles related to PMID 1 (1)\n  2  score 98765432\n"
        );
    }

    #[test]
    fn test_format_mesh() {
        let record = MeshRecord {
            ui: "D005600".to_string(),
            name: "Fragile X Syndrome".to_string(),
            scope_note: "A condition of the X chromosome.".to_string(),
            tree_numbers: vec!["C10.597".to_string(), "F03.625".to_string()],
            entry_terms: vec!["FXS".to_string()],
            annotation: String::new(),
        };
        assert_eq!(
            format_mesh(&record),
            "Fragile X Syndrome [D005600]\n\
             Tree numbers: C10.597, F03.625\n\
             Entry terms: FXS\n\
             \nA condition of the X chromosome.\n"
        );
    }

    #[test]
    fn test_write_exports_create_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let ris_path = dir.path().join("out/refs.ris");
        let bib_path = dir.path().join("out/nested/refs.bib");
        let refs = vec![reference(1, "111", Some(9))];

        write_ris_file(&ris_path, &refs).unwrap();
        write_bibtex_file(&bib_path, &refs).unwrap();

        let ris = fs::read_to_string(&ris_path).unwrap();
        assert!(ris.starts_with("TY  - JOUR\n"));
        assert!(ris.contains("AN  - 111\n"));
        let bib = fs::read_to_string(&bib_path).unwrap();
        assert!(bib.starts_with("@article{"));
        assert!(bib.contains("pmid = {111}"));
    }

    #[test]
    fn test_write_export_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let err = write_ris_file(&blocker.join("refs.ris"), &[]).unwrap_err();
        assert!(err.to_string().contains("file"));
    }
}
