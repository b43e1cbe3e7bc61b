// De-clustering: splits tokens that scraped text glued together.
//
// Copy-pasted JDs often lose the separators between list items, leaving
// "pythondjangokubernetes", "ReactRedux", or "python.django". A token is
// split when it:
//   - is at least 15 characters and contains two or more dictionary words,
//   - has a camelCase seam where every piece is a known term, or
//   - has a `word.word` shape with two alphabetic halves of 3+ letters.
// A `word.tld` shape ("acme.com", "stripe.io") is a domain: only the name
// survives, so "com" and "io" never reach candidate generation.
// Tokens that are themselves known terms ("JavaScript", "Node.js") are left
// alone.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use super::ruleset::Classifier;

static RE_WORDLIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9][A-Za-z0-9.]*[A-Za-z0-9]").expect("valid token regex")
});

static RE_DOTTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]{3,})\.([A-Za-z]{2,})$").expect("valid dotted regex"));

/// Top-level domains dropped from `name.tld` tokens.
const TLDS: &[&str] = &[
    "com", "org", "net", "edu", "gov", "io", "ai", "co", "dev", "app", "info", "biz", "tech",
    "us", "uk", "de", "eu", "ca",
];

/// Minimum length before dictionary segmentation is attempted.
const MIN_CLUSTER_LEN: usize = 15;

/// Splits concatenated tokens using the ruleset's single-word dictionary.
pub struct Declutterer<'a> {
    classifier: &'a Classifier,
    /// Lowercase dictionary words, longest first
    dictionary: Vec<&'a str>,
}

impl<'a> Declutterer<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self {
            classifier,
            dictionary: classifier.single_word_terms(3),
        }
    }

    /// Rewrite `text` with every clustered token split into its parts.
    pub fn declutter(&self, text: &str) -> String {
        RE_WORDLIKE
            .replace_all(text, |caps: &Captures| {
                let token = &caps[0];
                match self.split_token(token) {
                    Some(parts) => parts.join(" "),
                    None => token.to_string(),
                }
            })
            .into_owned()
    }

    /// The parts of a clustered token, or `None` if it should stay whole.
    pub fn split_token(&self, token: &str) -> Option<Vec<String>> {
        if self.classifier.is_known(token) {
            return None;
        }
        if let Some(caps) = RE_DOTTED.captures(token) {
            let suffix = caps[2].to_ascii_lowercase();
            if TLDS.contains(&suffix.as_str()) {
                return Some(vec![caps[1].to_string()]);
            }
            if suffix.len() >= 3 {
                return Some(vec![caps[1].to_string(), caps[2].to_string()]);
            }
        }
        if let Some(parts) = self.split_camel_case(token) {
            return Some(parts);
        }
        if token.len() >= MIN_CLUSTER_LEN && token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return self.segment(token);
        }
        None
    }

    /// Split at lower→upper seams when every resulting piece is a known term.
    fn split_camel_case(&self, token: &str) -> Option<Vec<String>> {
        let mut parts = Vec::new();
        let mut start = 0;
        let bytes = token.as_bytes();
        for i in 1..bytes.len() {
            if bytes[i - 1].is_ascii_lowercase() && bytes[i].is_ascii_uppercase() {
                parts.push(&token[start..i]);
                start = i;
            }
        }
        if parts.is_empty() {
            return None;
        }
        parts.push(&token[start..]);

        parts
            .iter()
            .all(|p| self.classifier.is_known(p))
            .then(|| parts.iter().map(|p| p.to_string()).collect())
    }

    /// Greedy longest-match segmentation. Text between dictionary words is
    /// kept as its own piece. Needs at least two dictionary words to split.
    fn segment(&self, token: &str) -> Option<Vec<String>> {
        let lower = token.to_ascii_lowercase();
        let mut parts: Vec<String> = Vec::new();
        let mut residue_start: Option<usize> = None;
        let mut matches = 0;
        let mut pos = 0;

        while pos < lower.len() {
            let rest = &lower[pos..];
            match self.dictionary.iter().find(|w| rest.starts_with(**w)) {
                Some(word) => {
                    if let Some(start) = residue_start.take() {
                        parts.push(token[start..pos].to_string());
                    }
                    parts.push(token[pos..pos + word.len()].to_string());
                    matches += 1;
                    pos += word.len();
                }
                None => {
                    residue_start.get_or_insert(pos);
                    pos += 1;
                }
            }
        }
        if let Some(start) = residue_start {
            parts.push(token[start..].to_string());
        }

        (matches >= 2).then_some(parts)
    }
}
