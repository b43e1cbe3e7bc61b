// JobDescription: the immutable input to keyword extraction.

use serde::{Deserialize, Serialize};

use super::{normalize, structure};

/// Structural shape of a cleaned job description, derived once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructureKind {
    Bullets,
    Sections,
    Narrative,
    Phrases,
    RawText,
}

impl StructureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StructureKind::Bullets => "bullets",
            StructureKind::Sections => "sections",
            StructureKind::Narrative => "narrative",
            StructureKind::Phrases => "phrases",
            StructureKind::RawText => "rawText",
        }
    }
}

/// A job description with its cleaned text and structure classification.
///
/// Fields are private so the derived values can never drift from `raw_text`.
#[derive(Debug, Clone, Serialize)]
pub struct JobDescription {
    raw_text: String,
    source_url: Option<String>,
    clean_text: String,
    structure: StructureKind,
}

impl JobDescription {
    /// Build from raw markup or text, truncating the cleaned text to
    /// `max_chars` bytes.
    pub fn new(raw_text: impl Into<String>, source_url: Option<String>, max_chars: usize) -> Self {
        let raw_text = raw_text.into();
        let clean_text = normalize::normalize(&raw_text, max_chars);
        let structure = structure::classify(&clean_text);
        let source_url = source_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());

        Self {
            raw_text,
            source_url,
            clean_text,
            structure,
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn clean_text(&self) -> &str {
        &self.clean_text
    }

    pub fn structure(&self) -> StructureKind {
        self.structure
    }
}
