// Frequency-based keyword extraction: the default KeywordExtractor.
//
// Pipeline for one JD:
//   1. split clustered tokens ("pythondjango" → "python django")
//   2. find mandatory dictionary hits
//   3. generate candidates: library phrases whose every word occurs in the
//      JD, technical-looking tokens, then plain words minus stop/noise words
//   4. score: log2(1 + freq) × section weight × category boost × learned boost
//   5. select: every mandatory hit plus the best of the rest up to
//      max_keywords, then split into high / medium / low tiers
//   6. feed the top terms back into the learned store
//
// Zero network calls, deterministic for a given ruleset and learned store.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use anyhow::Result;
use chrono::Utc;
use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use tracing::{debug, info};

use super::cache::{cache_key, KeywordCache};
use super::declutter::Declutterer;
use super::learned::LearnedKeywordStore;
use super::mandatory::find_mandatory;
use super::models::{Extraction, Keyword, Tier};
use super::ruleset::Classifier;
use super::traits::KeywordExtractor;
use crate::config::TailorConfig;
use crate::jd::models::JobDescription;
use crate::jd::structure::is_section_header;
use crate::text::{contains_whole_word, count_whole_word, normalize_term, tokenize};

/// Token shapes that read as technology names: `C++`/`C#`, dotted or
/// slashed names (`Node.js`, `CI/CD`), hyphenated compounds
/// (`event-driven`), inner capitals (`PostgreSQL`), and short acronyms.
static RE_TECHNICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[A-Za-z][A-Za-z0-9]*(?:\+\+|#)|[A-Za-z][A-Za-z0-9]*(?:[./][A-Za-z0-9]+)+|[A-Za-z]+(?:-[A-Za-z]+)+|[A-Za-z]*[a-z][A-Z][A-Za-z0-9]*|[A-Z][A-Z0-9]{1,5})$",
    )
    .expect("valid technical token regex")
});

static RE_SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid sentence regex"));

/// Where a candidate came from. Mandatory hits outrank everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Mandatory,
    Phrase,
    Technical,
    Word,
}

#[derive(Debug, Clone)]
struct Candidate {
    display: String,
    frequency: usize,
    source: Source,
}

/// Text segments with the weight of the section they sit in.
struct SectionWeights {
    segments: Vec<(String, f64)>,
}

impl SectionWeights {
    /// Segments inherit the weight of the most recent marker header; under
    /// a neutral header each sentence is judged by its own markers.
    fn build(text: &str, classifier: &Classifier) -> Self {
        let mut segments = Vec::new();
        let mut governing: Option<f64> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if is_section_header(line) {
                governing = classifier.header_weight(line);
            }
            for sentence in RE_SENTENCE_END.split(line) {
                let weight = governing.unwrap_or_else(|| classifier.sentence_weight(sentence));
                segments.push((sentence.to_string(), weight));
            }
        }
        Self { segments }
    }

    /// Highest weight among segments mentioning `term`; 1.0 if none do.
    fn weight_for(&self, term: &str) -> f64 {
        self.segments
            .iter()
            .filter(|(segment, _)| contains_whole_word(segment, term))
            .map(|(_, w)| *w)
            .fold(None, |best: Option<f64>, w| Some(best.map_or(w, |b| b.max(w))))
            .unwrap_or(1.0)
    }
}

/// Frequency × weight extractor over a classification ruleset.
pub struct FrequencyExtractor {
    classifier: Arc<Classifier>,
    learned: Arc<dyn LearnedKeywordStore>,
    config: TailorConfig,
    stop_words: HashSet<String>,
}

impl FrequencyExtractor {
    pub fn new(
        classifier: Arc<Classifier>,
        learned: Arc<dyn LearnedKeywordStore>,
        config: TailorConfig,
    ) -> Self {
        let stop_words = get(LANGUAGE::English)
            .into_iter()
            .map(|w| w.to_lowercase())
            .collect();
        Self {
            classifier,
            learned,
            config,
            stop_words,
        }
    }

    fn is_filler(&self, lower: &str) -> bool {
        self.stop_words.contains(lower) || self.classifier.is_noise(lower)
    }

    /// Steps 2–3: mandatory hits, library phrases, technical tokens, words.
    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let tokens = tokenize(text);
        let mut token_counts: HashMap<String, usize> = HashMap::new();
        for token in &tokens {
            *token_counts.entry(token.to_lowercase()).or_default() += 1;
        }

        let mut by_key: HashMap<String, Candidate> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut add = |key: String, candidate: Candidate| {
            if !by_key.contains_key(&key) {
                order.push(key.clone());
                by_key.insert(key, candidate);
            }
        };

        for hit in find_mandatory(&self.classifier, text) {
            add(
                normalize_term(&hit.term),
                Candidate {
                    display: hit.term,
                    frequency: hit.frequency,
                    source: Source::Mandatory,
                },
            );
        }

        // Library phrases, JD-only: every constituent word must be a JD token
        let mut phrase_words: HashSet<String> = HashSet::new();
        for phrase in self.classifier.phrases() {
            let words: Vec<&str> = phrase.split(' ').collect();
            if !words.iter().all(|w| token_counts.contains_key(*w)) {
                continue;
            }
            phrase_words.extend(words.iter().map(|w| w.to_string()));
            add(
                phrase.clone(),
                Candidate {
                    display: self.classifier.display_form(phrase),
                    frequency: count_whole_word(text, phrase).max(1),
                    source: Source::Phrase,
                },
            );
        }

        for token in &tokens {
            let lower = token.to_lowercase();
            if !RE_TECHNICAL.is_match(token) || self.is_filler(&lower) {
                continue;
            }
            if !token.starts_with(|c: char| c.is_ascii_alphabetic()) {
                continue;
            }
            let display = if self.classifier.is_known(token) {
                self.classifier.display_form(token)
            } else {
                token.to_string()
            };
            let frequency = token_counts.get(&lower).copied().unwrap_or(1);
            add(
                lower,
                Candidate {
                    display,
                    frequency,
                    source: Source::Technical,
                },
            );
        }

        for token in &tokens {
            let lower = token.to_lowercase();
            if lower.chars().count() < 3
                || !lower.starts_with(|c: char| c.is_alphabetic())
                || self.is_filler(&lower)
            {
                continue;
            }
            let frequency = token_counts.get(&lower).copied().unwrap_or(1);
            add(
                lower.clone(),
                Candidate {
                    display: self.classifier.display_form(&lower),
                    frequency,
                    source: Source::Word,
                },
            );
        }

        // Drop bare constituents of accepted phrases unless they stand on
        // their own as a categorized term
        order
            .into_iter()
            .filter_map(|key| by_key.remove(&key).map(|c| (key, c)))
            .filter(|(key, c)| {
                c.source == Source::Mandatory
                    || c.source == Source::Phrase
                    || !phrase_words.contains(key)
                    || !self.classifier.classify(key).is_empty()
            })
            .map(|(_, c)| c)
            .collect()
    }

    /// Step 4: turn a candidate into a scored (not yet tiered) keyword.
    fn score(&self, candidate: Candidate, sections: &SectionWeights) -> Keyword {
        let categories = self.classifier.classify(&candidate.display);
        let section_weight = sections.weight_for(&candidate.display);
        let category_boost = self.classifier.category_boost(&categories);
        let learned_boost = self
            .learned
            .boost(&candidate.display, self.config.learned_boost_cap);
        let score = (1.0 + candidate.frequency as f64).log2()
            * section_weight
            * category_boost
            * learned_boost;

        Keyword {
            term: candidate.display,
            categories,
            tier: Tier::Low,
            frequency_in_jd: candidate.frequency,
            score,
            target_mentions: self.config.low_mentions,
            mandatory: candidate.source == Source::Mandatory,
        }
    }
}

/// Step 5: keep every mandatory keyword plus the best-scoring others up to
/// `max_keywords`, ordered by priority (mandatory technical first).
pub fn select_keywords(mut scored: Vec<Keyword>, max_keywords: usize) -> Vec<Keyword> {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });

    let mandatory_count = scored.iter().filter(|k| k.mandatory).count();
    let limit = max_keywords.max(mandatory_count);
    let mut optional_slots = limit - mandatory_count;

    let (mut seeded, mut rest): (Vec<Keyword>, Vec<Keyword>) = scored
        .into_iter()
        .filter(|k| {
            if k.mandatory {
                true
            } else if optional_slots > 0 {
                optional_slots -= 1;
                true
            } else {
                false
            }
        })
        .partition(|k| k.mandatory && !k.is_soft_skill());

    seeded.append(&mut rest);
    seeded
}

/// Split priority-ordered keywords into tiers and set mention targets.
///
/// High gets `ceil(n × high_share)` slots, grown to fit every mandatory
/// technical term; soft skills never go high. Medium gets
/// `round(n × medium_share)` slots, and mandatory soft skills are always at
/// least medium. The result is ordered high, medium, low.
pub fn assign_tiers(mut keywords: Vec<Keyword>, config: &TailorConfig) -> Vec<Keyword> {
    let n = keywords.len() as f64;
    let mandatory_technical = keywords
        .iter()
        .filter(|k| k.mandatory && !k.is_soft_skill())
        .count();
    let high_slots = ((n * config.high_tier_share).ceil() as usize).max(mandatory_technical);
    let medium_slots = (n * config.medium_tier_share).round() as usize;

    let (mut high, mut medium) = (0, 0);
    for keyword in &mut keywords {
        keyword.tier = if !keyword.is_soft_skill() && high < high_slots {
            high += 1;
            Tier::High
        } else if medium < medium_slots || (keyword.mandatory && keyword.is_soft_skill()) {
            medium += 1;
            Tier::Medium
        } else {
            Tier::Low
        };
        keyword.target_mentions = config.mentions_for(keyword.tier);
    }

    // stable: priority order survives within each tier
    keywords.sort_by_key(|k| k.tier);
    keywords
}

impl KeywordExtractor for FrequencyExtractor {
    fn extract(&self, jd: &JobDescription) -> Result<Extraction> {
        let clean = jd.clean_text();
        if clean.chars().count() < self.config.min_jd_chars {
            debug!(
                chars = clean.chars().count(),
                minimum = self.config.min_jd_chars,
                "Job description too short for extraction"
            );
            return Ok(Extraction::empty(jd.structure()));
        }

        let text = Declutterer::new(&self.classifier).declutter(clean);
        let sections = SectionWeights::build(&text, &self.classifier);
        let candidates = self.candidates(&text);
        let candidate_count = candidates.len();

        let scored: Vec<Keyword> = candidates
            .into_iter()
            .map(|c| self.score(c, &sections))
            .collect();
        let keywords = assign_tiers(select_keywords(scored, self.config.max_keywords), &self.config);

        let now = Utc::now();
        let mut top: Vec<&Keyword> = keywords.iter().collect();
        top.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        for keyword in top.into_iter().take(self.config.learned_update_top_n) {
            self.learned.increment(&keyword.term, &keyword.categories, now);
        }

        info!(
            structure = jd.structure().as_str(),
            candidates = candidate_count,
            keywords = keywords.len(),
            mandatory = keywords.iter().filter(|k| k.mandatory).count(),
            high = keywords.iter().filter(|k| k.tier == Tier::High).count(),
            "Extracted JD keywords"
        );

        Ok(Extraction {
            keywords,
            structure: jd.structure(),
            from_cache: false,
        })
    }
}

/// Decorator that memoizes any extractor in a `KeywordCache`.
///
/// A hit returns the stored keywords with `from_cache` set and does no
/// scoring work at all. A miss runs the inner extractor under a cache
/// ticket, so a newer extraction for the same key wins.
pub struct CachingExtractor<E> {
    inner: E,
    cache: Arc<KeywordCache>,
}

impl<E: KeywordExtractor> CachingExtractor<E> {
    pub fn new(inner: E, cache: Arc<KeywordCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &KeywordCache {
        &self.cache
    }
}

impl<E: KeywordExtractor> KeywordExtractor for CachingExtractor<E> {
    fn extract(&self, jd: &JobDescription) -> Result<Extraction> {
        let key = cache_key(jd);
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, keywords = hit.keywords.len(), "Keyword cache hit");
            return Ok(Extraction {
                keywords: hit.keywords,
                structure: hit.structure,
                from_cache: true,
            });
        }

        let ticket = self.cache.begin(&key);
        let extraction = self.inner.extract(jd)?;
        self.cache
            .complete(ticket, extraction.keywords.clone(), extraction.structure);
        Ok(extraction)
    }
}
