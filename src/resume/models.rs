// Résumé data model: the document the injection engine rewrites.
//
// Only `summary`, `skills`, and each role's `bullets` are ever mutated.
// Company, title, and dates are read-only for the lifetime of a tailoring
// run; the validator checks that they come back byte-identical.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

/// One role. Roles are listed most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub title: String,
    pub dates: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub dates: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDocument {
    #[serde(default)]
    pub contact: Contact,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub certifications: Vec<String>,
}

/// Where a piece of mutable résumé text lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "section")]
pub enum TextLocation {
    Summary,
    Bullet { role: usize, bullet: usize },
    Skills,
}

impl std::fmt::Display for TextLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextLocation::Summary => write!(f, "summary"),
            TextLocation::Bullet { role, bullet } => write!(f, "role {} bullet {}", role + 1, bullet + 1),
            TextLocation::Skills => write!(f, "skills"),
        }
    }
}

impl ResumeDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid résumé JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read résumé at {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Failed to load résumé {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize résumé")
    }

    pub fn bullet_count(&self) -> usize {
        self.experience.iter().map(|e| e.bullets.len()).sum()
    }

    /// Every bullet with its location, in document order.
    pub fn bullets(&self) -> impl Iterator<Item = (TextLocation, &str)> {
        self.experience.iter().enumerate().flat_map(|(role, exp)| {
            exp.bullets
                .iter()
                .enumerate()
                .map(move |(bullet, text)| (TextLocation::Bullet { role, bullet }, text.as_str()))
        })
    }

    /// The mutable text at `location`. Skills are joined with ", ".
    pub fn text_at(&self, location: TextLocation) -> Option<String> {
        match location {
            TextLocation::Summary => Some(self.summary.clone()),
            TextLocation::Skills => Some(self.skills.join(", ")),
            TextLocation::Bullet { role, bullet } => self
                .experience
                .get(role)
                .and_then(|e| e.bullets.get(bullet))
                .cloned(),
        }
    }

    /// Replace one bullet. Returns false if the location does not exist.
    pub fn set_bullet(&mut self, role: usize, bullet: usize, text: String) -> bool {
        match self.experience.get_mut(role).and_then(|e| e.bullets.get_mut(bullet)) {
            Some(slot) => {
                *slot = text;
                true
            }
            None => false,
        }
    }

    /// Company, title, and dates of every role, for read-only checks.
    pub fn role_headers(&self) -> Vec<(&str, &str, &str)> {
        self.experience
            .iter()
            .map(|e| (e.company.as_str(), e.title.as_str(), e.dates.as_str()))
            .collect()
    }
}
