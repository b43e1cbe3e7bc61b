// Validator / scorer: measures a tailored résumé against its keyword set.
//
// Everything is computed over the rendered plain text, the same view an ATS
// parser gets. The report never fails: problems become warnings.

use serde::Serialize;

use super::diagnostics::Diagnostic;
use crate::config::TailorConfig;
use crate::keywords::models::{Keyword, Tier};
use crate::resume::models::ResumeDocument;
use crate::resume::render::{document_word_count, render_text};
use crate::text::{contains_whole_word, count_whole_word};

/// Whole-document mentions of one keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermMentions {
    pub term: String,
    pub tier: Tier,
    pub mentions: usize,
    pub minimum: usize,
    pub maximum: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Percentage of keywords present at least once (0–100)
    pub match_score: f64,
    pub matched_terms: Vec<String>,
    pub missing_terms: Vec<String>,
    /// Keyword occurrences per rendered word
    pub density: f64,
    /// Same order as the keyword list
    pub mentions: Vec<TermMentions>,
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Indices (into the keyword list) of keywords with no mentions.
    pub fn missing_indices(&self) -> Vec<usize> {
        self.mentions
            .iter()
            .enumerate()
            .filter(|(_, m)| m.mentions == 0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn meets(&self, threshold: f64) -> bool {
        self.match_score >= threshold
    }
}

/// Score `doc` against `keywords`.
pub fn validate(doc: &ResumeDocument, keywords: &[Keyword], config: &TailorConfig) -> ValidationReport {
    let rendered = render_text(doc);
    let words = document_word_count(doc);

    let mentions: Vec<TermMentions> = keywords
        .iter()
        .map(|k| TermMentions {
            term: k.term.clone(),
            tier: k.tier,
            mentions: count_whole_word(&rendered, &k.term),
            minimum: k.target_mentions.min,
            maximum: k.target_mentions.max,
        })
        .collect();

    let (matched, missing): (Vec<&TermMentions>, Vec<&TermMentions>) =
        mentions.iter().partition(|m| m.mentions > 0);
    let match_score = if keywords.is_empty() {
        0.0
    } else {
        matched.len() as f64 / keywords.len() as f64 * 100.0
    };

    let occurrences: usize = mentions.iter().map(|m| m.mentions).sum();
    let density = if words == 0 {
        0.0
    } else {
        occurrences as f64 / words as f64
    };

    let mut warnings = Vec::new();
    if density > config.density_ceiling {
        warnings.push(Diagnostic::DensityExceeded {
            density,
            ceiling: config.density_ceiling,
        });
    }

    for (role, exp) in doc.experience.iter().enumerate() {
        for (bullet, text) in exp.bullets.iter().enumerate() {
            let held = keywords
                .iter()
                .filter(|k| contains_whole_word(text, &k.term))
                .count();
            if held > config.max_keywords_per_bullet {
                warnings.push(Diagnostic::BulletOverloaded {
                    role,
                    bullet,
                    keywords: held,
                    maximum: config.max_keywords_per_bullet,
                });
            }
        }
    }

    if skills_are_bulleted(&doc.skills) {
        warnings.push(Diagnostic::SkillsBulleted);
    }

    for m in &mentions {
        if m.mentions > m.maximum {
            warnings.push(Diagnostic::TierMaximumExceeded {
                term: m.term.clone(),
                mentions: m.mentions,
                maximum: m.maximum,
            });
        }
    }

    ValidationReport {
        match_score,
        matched_terms: matched.iter().map(|m| m.term.clone()).collect(),
        missing_terms: missing.iter().map(|m| m.term.clone()).collect(),
        density,
        mentions,
        warnings,
    }
}

fn skills_are_bulleted(skills: &[String]) -> bool {
    skills
        .iter()
        .any(|s| s.trim_start().starts_with(['-', '•', '*', '·']))
}

/// True when every role's company, title, and dates are byte-identical.
pub fn role_headers_unchanged(before: &ResumeDocument, after: &ResumeDocument) -> bool {
    before.role_headers() == after.role_headers()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::models::{Category, MentionRange};
    use crate::resume::models::Experience;

    fn keyword(term: &str, tier: Tier, range: MentionRange) -> Keyword {
        Keyword {
            term: term.to_string(),
            categories: [Category::Language].into(),
            tier,
            frequency_in_jd: 1,
            score: 1.0,
            target_mentions: range,
            mandatory: false,
        }
    }

    fn doc(bullets: &[&str], skills: &[&str]) -> ResumeDocument {
        ResumeDocument {
            summary: "Engineer with a decade of backend work across payments and logistics companies.".to_string(),
            experience: vec![Experience {
                company: "Acme".to_string(),
                title: "Engineer".to_string(),
                dates: "2020".to_string(),
                bullets: bullets.iter().map(|b| b.to_string()).collect(),
            }],
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..ResumeDocument::default()
        }
    }

    #[test]
    fn test_match_score_and_missing() {
        let d = doc(
            &["Built ledger services in Rust and Python for the settlement team every quarter."],
            &["Rust"],
        );
        let keywords = vec![
            keyword("Rust", Tier::High, MentionRange::new(3, 5)),
            keyword("Python", Tier::High, MentionRange::new(3, 5)),
            keyword("Haskell", Tier::Low, MentionRange::new(1, 2)),
            keyword("Elixir", Tier::Low, MentionRange::new(1, 2)),
        ];
        let report = validate(&d, &keywords, &TailorConfig::default());
        assert!((report.match_score - 50.0).abs() < 1e-9);
        assert_eq!(report.matched_terms, vec!["Rust", "Python"]);
        assert_eq!(report.missing_terms, vec!["Haskell", "Elixir"]);
        assert_eq!(report.missing_indices(), vec![2, 3]);
        assert_eq!(report.mentions[0].mentions, 2);
    }

    #[test]
    fn test_density_warning() {
        let d = doc(&["Rust Rust Rust Rust."], &[]);
        let keywords = vec![keyword("Rust", Tier::High, MentionRange::new(3, 5))];
        let report = validate(&d, &keywords, &TailorConfig::default());
        assert!(report.density > 0.05);
        assert!(report
            .warnings
            .iter()
            .any(|w| matches!(w, Diagnostic::DensityExceeded { .. })));
    }

    #[test]
    fn test_overloaded_bullet_and_tier_maximum() {
        let d = doc(
            &["Shipped Rust, Go, Python, Kotlin and Scala services, then rewrote Rust tooling in Rust for Rust users in Rust."],
            &["Rust", "Kotlin"],
        );
        let keywords: Vec<Keyword> = ["Rust", "Python", "Kotlin", "Scala", "Golang"]
            .iter()
            .map(|t| keyword(t, Tier::Low, MentionRange::new(1, 2)))
            .collect();
        let report = validate(&d, &keywords, &TailorConfig::default());
        // Go is not Golang; four distinct keywords is at the limit
        assert!(!report
            .warnings
            .iter()
            .any(|w| matches!(w, Diagnostic::BulletOverloaded { .. })));
        assert!(report.warnings.contains(&Diagnostic::TierMaximumExceeded {
            term: "Rust".to_string(),
            mentions: 6,
            maximum: 2,
        }));

        let keywords: Vec<Keyword> = ["Rust", "Go", "Python", "Kotlin", "Scala"]
            .iter()
            .map(|t| keyword(t, Tier::Low, MentionRange::new(1, 10)))
            .collect();
        let report = validate(&d, &keywords, &TailorConfig::default());
        assert!(report.warnings.contains(&Diagnostic::BulletOverloaded {
            role: 0,
            bullet: 0,
            keywords: 5,
            maximum: 4,
        }));
    }

    #[test]
    fn test_bulleted_skills_warning() {
        let d = doc(&["Ran the payments platform."], &["- Rust", "- SQL"]);
        let report = validate(&d, &[], &TailorConfig::default());
        assert!(report.warnings.contains(&Diagnostic::SkillsBulleted));
        assert_eq!(report.match_score, 0.0);
    }

    #[test]
    fn test_role_headers_unchanged() {
        let before = doc(&["Ran billing."], &[]);
        let mut after = before.clone();
        after.experience[0].bullets[0] = "Ran billing with Rust.".to_string();
        assert!(role_headers_unchanged(&before, &after));
        after.experience[0].title = "Senior Engineer".to_string();
        assert!(!role_headers_unchanged(&before, &after));
    }
}
