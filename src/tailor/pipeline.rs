// Tailoring pipeline: one request from raw JD to tailored résumé.
//
//   normalize (JobDescription::new) → cache check → extract → allocate
//     → inject → validate → at most one recovery pass → TailoredResult
//
// The pipeline never fails. Short inputs and empty extractions pass the
// résumé through unchanged with a diagnostic; everything else returns the
// best document reached plus its validation report.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::allocator::allocate;
use super::connectors::strategy_for;
use super::diagnostics::Diagnostic;
use super::inject::{InjectionEngine, InjectionLog};
use super::validate::{role_headers_unchanged, validate, ValidationReport};
use crate::config::TailorConfig;
use crate::jd::models::{JobDescription, StructureKind};
use crate::keywords::cache::KeywordCache;
use crate::keywords::extractor::{CachingExtractor, FrequencyExtractor};
use crate::keywords::learned::LearnedKeywordStore;
use crate::keywords::models::{Extraction, Keyword};
use crate::keywords::ruleset::Classifier;
use crate::keywords::traits::KeywordExtractor;
use crate::resume::models::ResumeDocument;
use crate::resume::render::document_word_count;

/// Everything a tailoring request produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredResult {
    pub tailored_resume: ResumeDocument,
    pub match_score: f64,
    /// Distinct terms inserted, in first-insertion order
    pub injected_keywords: Vec<String>,
    pub warnings: Vec<Diagnostic>,
    pub report: ValidationReport,
    pub log: InjectionLog,
    pub keywords: Vec<Keyword>,
    pub structure: StructureKind,
    pub from_cache: bool,
    pub recovery_ran: bool,
}

impl TailoredResult {
    /// The résumé unchanged, scored against `keywords`.
    fn passthrough(
        resume: &ResumeDocument,
        keywords: Vec<Keyword>,
        structure: StructureKind,
        diagnostic: Diagnostic,
        config: &TailorConfig,
    ) -> Self {
        let report = validate(resume, &keywords, config);
        let mut warnings = vec![diagnostic];
        warnings.extend(report.warnings.iter().cloned());
        Self {
            tailored_resume: resume.clone(),
            match_score: report.match_score,
            injected_keywords: Vec::new(),
            warnings,
            report,
            log: InjectionLog::new(),
            keywords,
            structure,
            from_cache: false,
            recovery_ran: false,
        }
    }
}

/// Shared tailoring engine. One instance serves many requests; the cache and
/// the learned store are the only state carried between them.
pub struct Tailor {
    config: TailorConfig,
    classifier: Arc<Classifier>,
    extractor: CachingExtractor<FrequencyExtractor>,
    seed: Option<u64>,
}

impl Tailor {
    pub fn new(
        config: TailorConfig,
        classifier: Arc<Classifier>,
        learned: Arc<dyn LearnedKeywordStore>,
        cache: Arc<KeywordCache>,
    ) -> Self {
        let inner = FrequencyExtractor::new(Arc::clone(&classifier), learned, config.clone());
        Self {
            extractor: CachingExtractor::new(inner, cache),
            config,
            classifier,
            seed: None,
        }
    }

    /// Use seeded connector selection instead of the default rotation.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> &TailorConfig {
        &self.config
    }

    pub fn cache(&self) -> &KeywordCache {
        self.extractor.cache()
    }

    /// Extract (or fetch from cache) the keyword set for a JD. Extraction
    /// errors degrade to an empty set.
    pub fn extract(&self, jd: &JobDescription) -> Extraction {
        match self.extractor.extract(jd) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(error = %e, "Keyword extraction failed");
                Extraction::empty(jd.structure())
            }
        }
    }

    /// Run the whole pipeline for one JD.
    pub fn tailor(&self, jd: &JobDescription, resume: &ResumeDocument) -> TailoredResult {
        let config = &self.config;

        let jd_chars = jd.clean_text().chars().count();
        if jd_chars < config.min_jd_chars {
            warn!(chars = jd_chars, minimum = config.min_jd_chars, "Job description too short");
            let diagnostic = Diagnostic::InputTooShort {
                input: "job description".to_string(),
                length: jd_chars,
                minimum: config.min_jd_chars,
            };
            return TailoredResult::passthrough(resume, Vec::new(), jd.structure(), diagnostic, config);
        }

        let resume_words = document_word_count(resume);
        if resume_words < config.min_resume_words {
            warn!(words = resume_words, minimum = config.min_resume_words, "Résumé too short");
            let diagnostic = Diagnostic::InputTooShort {
                input: "résumé".to_string(),
                length: resume_words,
                minimum: config.min_resume_words,
            };
            return TailoredResult::passthrough(resume, Vec::new(), jd.structure(), diagnostic, config);
        }

        let extraction = self.extract(jd);
        if extraction.is_empty() {
            warn!("No keywords extracted; résumé returned unchanged");
            return TailoredResult::passthrough(
                resume,
                Vec::new(),
                extraction.structure,
                Diagnostic::NoKeywordsExtracted,
                config,
            );
        }
        let keywords = extraction.keywords;

        let plan = allocate(&keywords, config);
        let mut engine = InjectionEngine::new(
            config.clone(),
            Arc::clone(&self.classifier),
            strategy_for(self.seed),
        );

        let mut doc = resume.clone();
        let mut log = InjectionLog::new();
        let saturated = engine.inject(&mut doc, &keywords, &plan, &mut log);
        let mut report = validate(&doc, &keywords, config);

        let mut recovery_ran = false;
        if !report.meets(config.target_match_score) {
            let missing = report.missing_indices();
            info!(
                score = report.match_score,
                missing = missing.len(),
                "Match score below target, running recovery pass"
            );
            recovery_ran = true;

            let mut candidate = doc.clone();
            let mut recovery_log = InjectionLog::new();
            let recovered = engine.recover(&mut candidate, &keywords, &missing, &mut recovery_log);
            let recovered_report = validate(&candidate, &keywords, config);
            if recovered_report.match_score > report.match_score {
                info!(recovered, score = recovered_report.match_score, "Recovery improved match score");
                doc = candidate;
                log.extend(recovery_log);
                report = recovered_report;
            }
        }

        debug_assert!(role_headers_unchanged(resume, &doc));

        let mut warnings: Vec<Diagnostic> = saturated
            .into_iter()
            .filter_map(|d| match d {
                Diagnostic::InjectionSaturated { term, tier, minimum, .. } => {
                    let mentions = report.mentions.iter().find(|m| m.term == term)?.mentions;
                    (mentions < minimum).then_some(Diagnostic::InjectionSaturated {
                        term,
                        tier,
                        mentions,
                        minimum,
                    })
                }
                other => Some(other),
            })
            .collect();
        for diagnostic in &warnings {
            warn!(%diagnostic, "Keyword below minimum mentions");
        }
        warnings.extend(report.warnings.iter().cloned());
        if !report.meets(config.target_match_score) {
            warn!(
                score = report.match_score,
                threshold = config.target_match_score,
                missing = ?report.missing_terms,
                "Match score still below target"
            );
            warnings.push(Diagnostic::ValidationBelowThreshold {
                score: report.match_score,
                threshold: config.target_match_score,
                recovered: recovery_ran,
            });
        }

        info!(
            score = report.match_score,
            density = report.density,
            insertions = log.len(),
            from_cache = extraction.from_cache,
            "Tailoring complete"
        );

        TailoredResult {
            tailored_resume: doc,
            match_score: report.match_score,
            injected_keywords: log.terms(),
            warnings,
            report,
            log,
            keywords,
            structure: extraction.structure,
            from_cache: extraction.from_cache,
            recovery_ran,
        }
    }
}
