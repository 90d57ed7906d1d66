//! RIS export for reference managers (EndNote, Zotero, Mendeley).

use super::reference::Reference;

/// Longest abstract written to an `AB` line, in characters.
pub const MAX_RIS_ABSTRACT_CHARS: usize = 5000;

/// RIS text for `references`, records separated by a blank line.
///
/// Empty input yields an empty string.
pub fn generate_ris(references: &[Reference]) -> String {
    if references.is_empty() {
        return String::new();
    }
    let records: Vec<String> = references.iter().map(ris_record).collect();
    format!("{}\n", records.join("\n\n"))
}

/// One `TY  - JOUR` ... `ER  -` record.
pub fn ris_record(reference: &Reference) -> String {
    let mut lines = vec!["TY  - JOUR".to_string()];

    for author in ris_authors(reference) {
        push_tag(&mut lines, "AU", &author);
    }
    lines.push(format!("TI  - {}", single_line(&reference.title)));
    push_tag(&mut lines, "JO", &reference.journal);
    push_tag(&mut lines, "PY", &reference.year);
    if let Some(doi) = &reference.doi {
        push_tag(&mut lines, "DO", doi);
    }
    push_tag(&mut lines, "AN", &reference.pmid);
    if !reference.abstract_text.trim().is_empty() {
        let mut abstract_text: String = reference
            .abstract_text
            .chars()
            .take(MAX_RIS_ABSTRACT_CHARS)
            .collect();
        if reference.abstract_text.chars().count() > MAX_RIS_ABSTRACT_CHARS {
            abstract_text.push_str("...");
        }
        push_tag(&mut lines, "AB", &abstract_text);
    }
    lines.push("DB  - PubMed".to_string());
    if !reference.pmid.trim().is_empty() {
        lines.push(format!(
            "UR  - https://pubmed.ncbi.nlm.nih.gov/{}/",
            single_line(&reference.pmid)
        ));
    }
    if let Some(pmcid) = reference.pmcid.as_deref().map(single_line) {
        if !pmcid.is_empty() {
            lines.push(format!("L2  - {}", pmc_url(&pmcid)));
        }
    }
    lines.push("ER  -".to_string());

    lines.join("\n")
}

/// Free full-text page for a PubMed Central id.
pub fn pmc_url(pmcid: &str) -> String {
    format!("https://www.ncbi.nlm.nih.gov/pmc/articles/{}/", pmcid)
}

/// Individual authors; re-splits the display string when no list is kept.
fn ris_authors(reference: &Reference) -> Vec<String> {
    if !reference.author_list.is_empty() {
        return reference.author_list.clone();
    }
    let split = split_display_authors(&reference.authors);
    if split.is_empty() {
        vec!["Unknown".to_string()]
    } else {
        split
    }
}

/// Undo "A et al." and "A & B" joins made for display.
pub(crate) fn split_display_authors(display: &str) -> Vec<String> {
    let display = display.trim();
    if display.is_empty() {
        return Vec::new();
    }

    if let Some((first, _)) = display.split_once(" et al.") {
        let first = first.trim();
        if !first.is_empty() {
            return vec![first.to_string()];
        }
    }

    let parts: Vec<String> = display
        .split(" & ")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    if parts.is_empty() {
        vec![display.to_string()]
    } else {
        parts
    }
}

fn push_tag(lines: &mut Vec<String>, tag: &str, value: &str) {
    let value = single_line(value);
    if !value.is_empty() {
        lines.push(format!("{}  - {}", tag, value));
    }
}

/// Collapse newlines, tabs and runs of spaces; the format is line-oriented.
fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
