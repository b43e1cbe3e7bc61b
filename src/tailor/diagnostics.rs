// Diagnostics: every way a tailoring run can degrade.
//
// None of these are errors: the engine always hands back a résumé. They are
// attached to the result so callers (and the terminal report) can explain
// why the output is less than ideal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keywords::models::Tier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// JD or résumé below its minimum length; the résumé passes through unchanged
    InputTooShort {
        input: String,
        length: usize,
        minimum: usize,
    },
    /// Extraction produced no keywords; the résumé passes through unchanged
    NoKeywordsExtracted,
    /// No eligible line was left to reach a keyword's minimum mentions
    InjectionSaturated {
        term: String,
        tier: Tier,
        mentions: usize,
        minimum: usize,
    },
    /// Match score below target after the run; `recovered` says whether the
    /// recovery pass ran
    ValidationBelowThreshold {
        score: f64,
        threshold: f64,
        recovered: bool,
    },
    DensityExceeded {
        density: f64,
        ceiling: f64,
    },
    /// `role` and `bullet` are zero-based
    BulletOverloaded {
        role: usize,
        bullet: usize,
        keywords: usize,
        maximum: usize,
    },
    SkillsBulleted,
    TierMaximumExceeded {
        term: String,
        mentions: usize,
        maximum: usize,
    },
}

impl Diagnostic {
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::InputTooShort { .. } => "inputTooShort",
            Diagnostic::NoKeywordsExtracted => "noKeywordsExtracted",
            Diagnostic::InjectionSaturated { .. } => "injectionSaturated",
            Diagnostic::ValidationBelowThreshold { .. } => "validationBelowThreshold",
            Diagnostic::DensityExceeded { .. } => "densityExceeded",
            Diagnostic::BulletOverloaded { .. } => "bulletOverloaded",
            Diagnostic::SkillsBulleted => "skillsBulleted",
            Diagnostic::TierMaximumExceeded { .. } => "tierMaximumExceeded",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InputTooShort {
                input,
                length,
                minimum,
            } => write!(f, "{input} too short ({length} < {minimum}); résumé returned unchanged"),
            Diagnostic::NoKeywordsExtracted => {
                write!(f, "no keywords extracted from the job description")
            }
            Diagnostic::InjectionSaturated {
                term,
                tier,
                mentions,
                minimum,
            } => write!(
                f,
                "'{term}' ({tier}) reached {mentions} of {minimum} minimum mentions; no eligible lines left"
            ),
            Diagnostic::ValidationBelowThreshold {
                score,
                threshold,
                recovered,
            } => {
                let after = if *recovered { " after recovery" } else { "" };
                write!(f, "match score {score:.1}% below target {threshold:.1}%{after}")
            }
            Diagnostic::DensityExceeded { density, ceiling } => write!(
                f,
                "keyword density {:.1}% above ceiling {:.1}%",
                density * 100.0,
                ceiling * 100.0
            ),
            Diagnostic::BulletOverloaded {
                role,
                bullet,
                keywords,
                maximum,
            } => write!(
                f,
                "role {} bullet {} holds {keywords} keywords (max {maximum})",
                role + 1,
                bullet + 1
            ),
            Diagnostic::SkillsBulleted => {
                write!(f, "skills section is bulleted; ATS parsers prefer a comma-separated list")
            }
            Diagnostic::TierMaximumExceeded {
                term,
                mentions,
                maximum,
            } => write!(f, "'{term}' appears {mentions} times (tier max {maximum})"),
        }
    }
}
