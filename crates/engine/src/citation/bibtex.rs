//! BibTeX export with collision-free citation keys.

use super::reference::Reference;
use super::ris::split_display_authors;
use std::collections::HashMap;

const MAX_KEY_LEN: usize = 64;

/// `@article` entries for `references`, separated by blank lines.
pub fn generate_bibtex(references: &[Reference]) -> String {
    if references.is_empty() {
        return String::new();
    }

    let keys = citation_keys(references);
    let entries: Vec<String> = references
        .iter()
        .zip(&keys)
        .map(|(reference, key)| bibtex_entry(key, reference))
        .collect();
    format!("{}\n", entries.join("\n\n"))
}

/// Keys in input order; the second use of a base gets "a", the third "b".
pub fn citation_keys(references: &[Reference]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    references
        .iter()
        .enumerate()
        .map(|(i, reference)| {
            let base = key_base(reference).unwrap_or_else(|| format!("Ref{}", i + 1));
            let count = seen.entry(base.clone()).or_insert(0);
            let key = format!("{}{}", base, alpha_suffix(*count));
            *count += 1;
            key
        })
        .collect()
}

fn bibtex_entry(key: &str, reference: &Reference) -> String {
    let mut lines = vec![format!("@article{{{},", key)];

    let authors = bibtex_authors(reference);
    let fields = [
        ("author", authors.as_str()),
        ("title", reference.title.as_str()),
        ("journal", reference.journal.as_str()),
        ("year", reference.year.as_str()),
        ("doi", reference.doi.as_deref().unwrap_or_default()),
        ("pmid", reference.pmid.as_str()),
        ("pmcid", reference.pmcid.as_deref().unwrap_or_default()),
    ];
    for (name, value) in fields {
        let value = latex_escape(value);
        if !value.is_empty() {
            lines.push(format!("  {} = {{{}}},", name, value));
        }
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn bibtex_authors(reference: &Reference) -> String {
    if !reference.author_list.is_empty() {
        return reference.author_list.join(" and ");
    }
    split_display_authors(&reference.authors)
        .iter()
        .map(|name| invert_display_name(name))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// "Smith J" to "Smith, J"; names with a comma or without initials are kept.
fn invert_display_name(name: &str) -> String {
    if name.contains(',') {
        return name.trim().to_string();
    }
    match split_initials(name) {
        (family, Some(initials)) => format!("{}, {}", family, initials),
        (family, None) => family.to_string(),
    }
}

/// Split the trailing initials off a display name ("van Dijk JA").
fn split_initials(name: &str) -> (&str, Option<&str>) {
    let name = name.trim();
    match name.rsplit_once(' ') {
        Some((family, tail)) if is_initials(tail) && !family.trim().is_empty() => {
            (family.trim(), Some(tail))
        }
        _ => (name, None),
    }
}

fn is_initials(token: &str) -> bool {
    let count = token.chars().count();
    (1..=4).contains(&count) && token.chars().all(char::is_uppercase)
}

fn key_base(reference: &Reference) -> Option<String> {
    let first_author = match reference.author_list.first() {
        Some(author) => author.clone(),
        None => split_display_authors(&reference.authors)
            .into_iter()
            .next()
            .unwrap_or_default(),
    };

    let year = first_year(&reference.year).unwrap_or("nd");
    let raw = format!("{}{}", surname_of(&first_author), year);
    sanitize_key(&raw).or_else(|| sanitize_key(&format!("Ref{}", year)))
}

/// Family-name token of "Last, Fore" or the display form "Last Initials".
fn surname_of(author: &str) -> &str {
    let author = author.trim();
    if author.is_empty() {
        return "Unknown";
    }
    let family = match author.split_once(',') {
        Some((family, _)) => family,
        None => split_initials(author).0,
    };
    family.split_whitespace().last().unwrap_or("Unknown")
}

fn first_year(year: &str) -> Option<&str> {
    let bytes = year.as_bytes();
    (0..bytes.len().saturating_sub(3))
        .find(|&i| bytes[i..i + 4].iter().all(u8::is_ascii_digit))
        .map(|i| &year[i..i + 4])
}

/// ASCII letters and digits only, never starting with a digit.
fn sanitize_key(raw: &str) -> Option<String> {
    let mut key: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
    if key.is_empty() {
        return None;
    }
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert_str(0, "Ref");
    }
    key.truncate(MAX_KEY_LEN);
    Some(key)
}

/// "" for 0, then a..z, aa, ab, ...
pub fn alpha_suffix(n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let mut n = n - 1;
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Escape characters special to LaTeX and flatten whitespace.
pub fn latex_escape(value: &str) -> String {
    let flat = value.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut escaped = String::with_capacity(flat.len());
    for c in flat.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '{' | '}' | '%' | '&' | '$' | '#' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '~' => escaped.push_str("\\~{}"),
            '^' => escaped.push_str("\\^{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}
