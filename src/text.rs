// Lexical helpers shared by extraction, injection, and validation.
//
// Every keyword comparison in the crate goes through `find_whole_word`, so
// "Kubernetes" is found in "Kubernetes-based" and "kubernetes," but not in
// "kubernetesish". Case folding is ASCII-only, which keeps byte offsets in
// the folded string identical to the original. Insertion code relies on
// that to splice text at positions found in the folded copy.

/// True when a character can be part of a word. Letters and digits in any
/// script count; dashes, curly quotes, bullets, and ellipses do not.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Byte offsets of every whole-word, case-insensitive occurrence of `needle`.
///
/// A boundary is only required on a side where the needle itself starts or
/// ends with a word character: `C++` matches in "C++, Rust" even though the
/// next character after the `+` is a comma, and `.NET` matches in "ASP.NET".
/// Boundaries are judged on whole characters, so "Kubernetes\u{2014}on-prem"
/// and "\u{201c}Kubernetes\u{201d}" both match while "Kubernetesé" does not.
pub fn find_whole_word(haystack: &str, needle: &str) -> Vec<usize> {
    let needle = needle.trim();
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }

    let hay = haystack.to_ascii_lowercase();
    let pat = needle.to_ascii_lowercase();
    let check_start = pat.chars().next().is_some_and(is_word_char);
    let check_end = pat.chars().next_back().is_some_and(is_word_char);

    hay.match_indices(pat.as_str())
        .filter(|(start, _)| {
            let end = start + pat.len();
            let before = hay[..*start].chars().next_back();
            let after = hay[end..].chars().next();
            let start_ok = !check_start || !before.is_some_and(is_word_char);
            let end_ok = !check_end || !after.is_some_and(is_word_char);
            start_ok && end_ok
        })
        .map(|(start, _)| start)
        .collect()
}

/// Whole-word, case-insensitive containment.
pub fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    !find_whole_word(haystack, needle).is_empty()
}

/// Number of whole-word, case-insensitive occurrences.
pub fn count_whole_word(haystack: &str, needle: &str) -> usize {
    find_whole_word(haystack, needle).len()
}

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Characters that may appear inside a technical token (`C++`, `C#`,
/// `Node.js`, `CI/CD`, `event-driven`).
fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '+' | '#' | '.' | '/' | '-' | '_')
}

/// Split text into candidate tokens, keeping technical punctuation inside
/// tokens but trimming it from the edges (sentence periods, dashes).
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !is_token_char(c))
        .map(|t| t.trim_start_matches(['.', '-', '/', '_', '+', '#']))
        .map(|t| t.trim_end_matches(['.', '-', '/', '_']))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Canonical comparison key for a term: lowercase with collapsed spaces.
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Truncate `text` to at most `max_bytes`, moving back to a char boundary.
pub fn floor_char_boundary(text: &str, max_bytes: usize) -> usize {
    if max_bytes >= text.len() {
        return text.len();
    }
    let mut idx = max_bytes;
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
