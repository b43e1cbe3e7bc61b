// Text normalizer: turns scraped JD markup into clean plain text.
//
// Four stages, each a pure function of its input:
//   1. markup stripping (navigation/script blocks dropped, block tags become
//      line breaks, entities decoded)
//   2. boilerplate removal (EEO statements, benefits lists, apply footers,
//      page chrome like "Share this job")
//   3. whitespace collapse
//   4. truncation at a paragraph, then sentence, then hard boundary
//
// Nothing here can fail: unparsable input simply produces less (or no) text.

use std::sync::LazyLock;

use regex_lite::{Captures, Regex};

use super::structure::is_section_header;
use crate::text::floor_char_boundary;

/// Elements whose entire content is page chrome.
const CHROME_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "button", "svg",
];

static RE_CHROME: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CHROME_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).expect("valid chrome regex")
        })
        .collect()
});

static RE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static RE_LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*li\b[^>]*>").expect("valid list item regex"));

static RE_BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*/?\s*(br|p|div|h[1-6]|tr|ul|ol|li|section|article|table)\b[^>]*>")
        .expect("valid block tag regex")
});

static RE_ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s*/?\s*[A-Za-z!][^>]*>").expect("valid tag regex"));

static RE_NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x?[0-9A-Fa-f]{1,6});").expect("valid entity regex"));

/// Headers that open a non-substantive section; everything under them is
/// dropped until the next substantive header.
static RE_BOILERPLATE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(our\s+)?(benefits|perks|what we offer|compensation (and|&) benefits|how to apply|to apply|application process|equal (employment )?opportunity|eeo( statement)?|diversity (and|&) inclusion statement|legal disclaimer)\b",
    )
    .expect("valid boilerplate header regex")
});

/// Sentences that are legal boilerplate wherever they appear.
static RE_BOILERPLATE_SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[^.\n]*(equal opportunity employer|without regard to|regardless of (race|gender|age|religion)|reasonable accommodations?|e-verify|protected veteran)[^.\n]*\.?",
    )
    .expect("valid boilerplate sentence regex")
});

/// Page chrome lines left behind by scrapers.
static RE_CHROME_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(apply now|apply for this job|share this job|save (this )?job|sign in|log in|back to (all )?jobs|accept( all)? cookies|we use cookies|skip to (main )?content|report this job)\b",
    )
    .expect("valid chrome line regex")
});

static RE_INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\x{a0}]+").expect("valid whitespace regex"));

/// Full normalization: markup → boilerplate → whitespace → truncation.
pub fn normalize(raw: &str, max_chars: usize) -> String {
    let text = if looks_like_markup(raw) {
        strip_markup(raw)
    } else {
        decode_entities(raw)
    };
    let text = remove_boilerplate(&text);
    let text = collapse_whitespace(&text);
    truncate_at_boundary(&text, max_chars)
}

/// True if the input contains at least one HTML-looking tag.
pub fn looks_like_markup(raw: &str) -> bool {
    RE_ANY_TAG.is_match(raw)
}

/// Drop chrome elements, turn block tags into line breaks, strip the rest.
pub fn strip_markup(raw: &str) -> String {
    let mut text = RE_COMMENT.replace_all(raw, " ").into_owned();
    for re in RE_CHROME.iter() {
        text = re.replace_all(&text, "\n").into_owned();
    }
    let text = RE_LIST_ITEM.replace_all(&text, "\n- ");
    let text = RE_BLOCK_TAG.replace_all(&text, "\n");
    let text = RE_ANY_TAG.replace_all(&text, " ");
    decode_entities(&text)
}

/// Decode the handful of entities scraped JDs actually contain.
pub fn decode_entities(text: &str) -> String {
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&bull;", "-");
    let text = RE_NUMERIC_ENTITY.replace_all(&text, |caps: &Captures| {
        let code = &caps[1];
        let parsed = match code.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        parsed
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_default()
    });
    // &amp; last so "&amp;lt;" stays literal
    text.replace("&amp;", "&")
}

/// Remove EEO/benefits/apply passages and page chrome lines.
pub fn remove_boilerplate(text: &str) -> String {
    let mut kept = Vec::new();
    let mut in_boilerplate = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !in_boilerplate {
                kept.push(String::new());
            }
            continue;
        }

        let header_text = trimmed.trim_start_matches(['#', '*', ' ']);
        if RE_BOILERPLATE_HEADER.is_match(header_text) && is_section_header(trimmed) {
            in_boilerplate = true;
            continue;
        }
        if in_boilerplate {
            if is_section_header(trimmed) {
                in_boilerplate = false;
            } else {
                continue;
            }
        }
        if RE_CHROME_LINE.is_match(trimmed) && trimmed.len() < 80 {
            continue;
        }

        let cleaned = RE_BOILERPLATE_SENTENCE.replace_all(line, "");
        if !cleaned.trim().is_empty() {
            kept.push(cleaned.into_owned());
        }
    }

    kept.join("\n")
}

/// Collapse runs of inline whitespace and limit blank lines to one.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut blank_run = false;

    for line in text.lines() {
        let line = RE_INLINE_SPACE.replace_all(line.trim(), " ");
        if line.is_empty() {
            if !blank_run && !out.is_empty() {
                out.push(String::new());
            }
            blank_run = true;
        } else {
            out.push(line.into_owned());
            blank_run = false;
        }
    }

    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Truncate to `max_chars` bytes, preferring a paragraph break, then a
/// sentence end, then a hard cut at a char boundary. Boundaries in the first
/// half of the window are ignored so truncation never discards most of the text.
pub fn truncate_at_boundary(text: &str, max_chars: usize) -> String {
    if text.len() <= max_chars {
        return text.to_string();
    }

    let cut = floor_char_boundary(text, max_chars);
    let window = &text[..cut];
    let half = cut / 2;

    if let Some(pos) = window.rfind("\n\n").filter(|&p| p >= half) {
        return window[..pos].trim_end().to_string();
    }

    let sentence_end = [". ", ".\n", "! ", "? "]
        .iter()
        .filter_map(|m| window.rfind(m))
        .max()
        .filter(|&p| p >= half);
    if let Some(pos) = sentence_end {
        return window[..=pos].trim_end().to_string();
    }

    window.trim_end().to_string()
}
