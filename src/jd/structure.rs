// Structural classification of cleaned JD text.
//
// Checks run in priority order (bullet density, section-header density,
// narrative markers, technical-token ratio) and the first that fires wins.
// Anything else is `RawText`.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::models::StructureKind;
use crate::text::{tokenize, word_count};

static RE_BULLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([-*•·–▪]|\d{1,2}[.)])\s+").expect("valid bullet regex")
});

static RE_KNOWN_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(about (us|the (role|team|company|job))|(key )?responsibilities|(minimum |basic |preferred )?qualifications|requirements|what you('|’)ll (do|need)|what you bring|what we offer|what we('|’)re looking for|benefits|perks|nice to have|bonus points|skills|the role|your role|who you are|how to apply|overview|job description)\s*:?$",
    )
    .expect("valid header regex")
});

const NARRATIVE_MARKERS: &[&str] = &[
    "you will",
    "you'll",
    "we are",
    "we're",
    "our team",
    "you are",
    "join us",
    "your role",
    "we believe",
    "you'd",
];

/// True for a line that starts a list item.
pub fn is_bullet_line(line: &str) -> bool {
    RE_BULLET.is_match(line)
}

/// True for a short line that introduces a section ("Requirements:",
/// "ABOUT US", "What you'll do").
pub fn is_section_header(line: &str) -> bool {
    let trimmed = line.trim().trim_start_matches(['#', '*', ' ']).trim_end_matches('*');
    if trimmed.len() < 3 || trimmed.len() > 60 || is_bullet_line(trimmed) {
        return false;
    }
    let words = word_count(trimmed);

    if trimmed.ends_with(':') && words <= 8 {
        return true;
    }
    if RE_KNOWN_HEADER.is_match(trimmed) {
        return true;
    }
    let letters: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 4 && words <= 5 && letters.iter().all(|c| c.is_uppercase())
}

/// A token that looks like a technology name rather than prose.
fn is_technical_token(token: &str) -> bool {
    let has_symbol = token.contains(['+', '#', '.', '/']) || token.chars().any(|c| c.is_ascii_digit());
    let inner_upper = token.chars().skip(1).any(|c| c.is_uppercase());
    has_symbol || inner_upper
}

/// Classify the shape of cleaned JD text.
pub fn classify(clean_text: &str) -> StructureKind {
    let lines: Vec<&str> = clean_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return StructureKind::RawText;
    }
    let line_count = lines.len() as f64;

    let bullets = lines.iter().filter(|l| is_bullet_line(l)).count();
    if bullets >= 3 && bullets as f64 / line_count >= 0.3 {
        return StructureKind::Bullets;
    }

    let headers = lines.iter().filter(|l| is_section_header(l)).count();
    if headers >= 2 && headers as f64 / line_count >= 0.1 {
        return StructureKind::Sections;
    }

    let lower = clean_text.to_lowercase();
    let markers: usize = NARRATIVE_MARKERS
        .iter()
        .map(|m| lower.matches(m).count())
        .sum();
    let sentences = clean_text.matches(['.', '!', '?']).count();
    if markers >= 2 && sentences >= 3 {
        return StructureKind::Narrative;
    }

    let tokens = tokenize(clean_text);
    if !tokens.is_empty() {
        let technical = tokens.iter().filter(|t| is_technical_token(t)).count();
        let commas = clean_text.matches(',').count();
        if technical as f64 / tokens.len() as f64 >= 0.25 || commas * 3 >= tokens.len() {
            return StructureKind::Phrases;
        }
    }

    StructureKind::RawText
}
