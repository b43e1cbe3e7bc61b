// Injection engine: rewrites résumé prose until keywords reach their
// mention targets, without ever touching company, title, or dates.
//
// Work order for one run:
//   1. coverage-first rounds over experience bullets: round r lifts every
//      experience-pool keyword below min(r, its minimum) by one mention, so
//      every term gets its first mention before any gets its second
//   2. summary clause ("Expertise includes A, B, and C.")
//   3. skills list top-up
//   4. extra passes for keywords still below their minimum, with the
//      per-bullet cap raised each pass
//
// Every candidate rewrite is checked against the whole-document tally and
// refused if it would push density over the ceiling, push any keyword past
// its tier maximum, overload the bullet, or lower any keyword's count.
// Eligibility is a function of document state only, so running the engine
// again on its own output inserts nothing.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::allocator::SectionPlan;
use super::connectors::ConnectorStrategy;
use super::diagnostics::Diagnostic;
use crate::config::TailorConfig;
use crate::keywords::models::{Keyword, Tier};
use crate::keywords::ruleset::Classifier;
use crate::resume::models::{ResumeDocument, TextLocation};
use crate::resume::render::{document_word_count, render_text};
use crate::text::{contains_whole_word, count_whole_word, word_count};

/// How a keyword was worked into a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    /// "Built Kafka-based pipelines"
    ActionVerb,
    /// "Built pipelines using Kafka, cutting latency"
    BeforeComma,
    /// "Built pipelines using Kafka."
    BeforePeriod,
    /// "Built pipelines, using Kafka"
    Append,
    SummaryClause,
    SkillsList,
}

/// One insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InjectionRecord {
    pub term: String,
    pub location: TextLocation,
    pub strategy: Strategy,
    /// Whole-document mentions of the term right after this insertion
    pub mention_count_after: usize,
}

/// Append-only record of every insertion in a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InjectionLog {
    records: Vec<InjectionRecord>,
}

impl InjectionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: InjectionRecord) {
        self.records.push(record);
    }

    /// Append every record of a later log.
    pub fn extend(&mut self, later: InjectionLog) {
        self.records.extend(later.records);
    }

    pub fn records(&self) -> &[InjectionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records grouped by term, in insertion order.
    pub fn by_term(&self) -> BTreeMap<&str, Vec<&InjectionRecord>> {
        let mut map: BTreeMap<&str, Vec<&InjectionRecord>> = BTreeMap::new();
        for record in &self.records {
            map.entry(record.term.as_str()).or_default().push(record);
        }
        map
    }

    /// Distinct injected terms, in first-insertion order.
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for record in &self.records {
            if !terms.contains(&record.term) {
                terms.push(record.term.clone());
            }
        }
        terms
    }
}

/// Why a rewrite was refused.
#[derive(Debug, Clone, PartialEq)]
enum Refusal {
    NoGain,
    Density(f64),
    TierMaximum(String),
    BulletCap(usize),
    Decrease(String),
}

/// Running whole-document keyword counts.
struct Tally {
    counts: Vec<usize>,
    occurrences: usize,
    words: usize,
}

/// An accepted rewrite, ready to apply.
struct Change {
    deltas: Vec<usize>,
    words_added: usize,
}

impl Tally {
    fn new(doc: &ResumeDocument, keywords: &[Keyword]) -> Self {
        let rendered = render_text(doc);
        let counts: Vec<usize> = keywords
            .iter()
            .map(|k| count_whole_word(&rendered, &k.term))
            .collect();
        Self {
            occurrences: counts.iter().sum(),
            counts,
            words: document_word_count(doc),
        }
    }

    /// Check replacing `old` with `new` for keyword `target`.
    fn check(
        &self,
        keywords: &[Keyword],
        target: usize,
        old: &str,
        new: &str,
        bullet_cap: Option<usize>,
        ceiling: f64,
    ) -> Result<Change, Refusal> {
        let mut deltas = vec![0; keywords.len()];
        let mut present = 0;
        for (i, keyword) in keywords.iter().enumerate() {
            let before = count_whole_word(old, &keyword.term);
            let after = count_whole_word(new, &keyword.term);
            if after < before {
                return Err(Refusal::Decrease(keyword.term.clone()));
            }
            if after > 0 {
                present += 1;
            }
            if after > before {
                if self.counts[i] + (after - before) > keyword.target_mentions.max {
                    return Err(Refusal::TierMaximum(keyword.term.clone()));
                }
                deltas[i] = after - before;
            }
        }
        if deltas[target] == 0 {
            return Err(Refusal::NoGain);
        }
        if let Some(cap) = bullet_cap {
            if present > cap {
                return Err(Refusal::BulletCap(present));
            }
        }

        let words_added = word_count(new).saturating_sub(word_count(old));
        let occurrences = self.occurrences + deltas.iter().sum::<usize>();
        let words = self.words + words_added;
        let density = if words == 0 { 1.0 } else { occurrences as f64 / words as f64 };
        if density > ceiling {
            return Err(Refusal::Density(density));
        }
        Ok(Change {
            deltas,
            words_added,
        })
    }

    fn apply(&mut self, change: &Change) {
        for (count, delta) in self.counts.iter_mut().zip(&change.deltas) {
            *count += delta;
        }
        self.occurrences += change.deltas.iter().sum::<usize>();
        self.words += change.words_added;
    }
}

/// Distinct keywords present in `line`.
fn keywords_in(line: &str, keywords: &[Keyword]) -> usize {
    keywords
        .iter()
        .filter(|k| contains_whole_word(line, &k.term))
        .count()
}

/// "A", "A and B", "A, B, and C".
fn join_terms(terms: &[String]) -> String {
    match terms {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

const CLAUSE_OPENER: &str = "Expertise includes";

/// Keyword-driven rewriting of résumé prose.
pub struct InjectionEngine {
    config: TailorConfig,
    classifier: Arc<Classifier>,
    connectors: Box<dyn ConnectorStrategy>,
}

impl InjectionEngine {
    pub fn new(
        config: TailorConfig,
        classifier: Arc<Classifier>,
        connectors: Box<dyn ConnectorStrategy>,
    ) -> Self {
        Self {
            config,
            classifier,
            connectors,
        }
    }

    /// Rewrite `line` so it mentions `term`, using the first applicable
    /// strategy.
    pub fn rewrite_line(&mut self, line: &str, term: &str, technical: bool) -> (String, Strategy) {
        let trimmed = line.trim_end();

        if technical && !term.contains(' ') {
            if let Some(rewritten) = self.after_action_verb(trimmed, term) {
                return (rewritten, Strategy::ActionVerb);
            }
        }

        let connector = self.connectors.next_connector();
        if let Some(pos) = first_clause_comma(trimmed) {
            let rewritten = format!("{} {connector} {term}{}", &trimmed[..pos], &trimmed[pos..]);
            return (rewritten, Strategy::BeforeComma);
        }
        if let Some(body) = trimmed.strip_suffix('.') {
            if !body.is_empty() {
                return (format!("{body} {connector} {term}."), Strategy::BeforePeriod);
            }
        }
        let body = trimmed.trim_end_matches([',', ';', ':']);
        (format!("{body}, {connector} {term}"), Strategy::Append)
    }

    /// "Built pipelines" → "Built Kafka-based pipelines". Articles directly
    /// after the verb are kept in front of the modifier and agree with it.
    fn after_action_verb(&self, line: &str, term: &str) -> Option<String> {
        let mut words = line.splitn(2, ' ');
        let verb = words.next()?;
        let rest = words.next()?.trim_start();
        let bare_verb = verb.trim_matches(|c: char| !c.is_alphabetic());
        if rest.is_empty() || !self.classifier.is_action_verb(bare_verb) {
            return None;
        }

        let modifier = format!("{term}-based");
        let (article, noun_phrase) = match rest.split_once(' ') {
            Some((first, tail)) if matches!(first.to_ascii_lowercase().as_str(), "a" | "an") => {
                let starts_with_vowel = term
                    .chars()
                    .next()
                    .is_some_and(|c| "aeiouAEIOU".contains(c));
                let article = match (first.starts_with(['A']), starts_with_vowel) {
                    (true, true) => "An",
                    (true, false) => "A",
                    (false, true) => "an",
                    (false, false) => "a",
                };
                (Some(article.to_string()), tail)
            }
            Some((first, tail)) if first.eq_ignore_ascii_case("the") => (Some(first.to_string()), tail),
            _ => (None, rest),
        };
        if noun_phrase.trim().is_empty() {
            return None;
        }

        Some(match article {
            Some(article) => format!("{verb} {article} {modifier} {noun_phrase}"),
            None => format!("{verb} {modifier} {noun_phrase}"),
        })
    }

    /// Per-bullet cap for the main sweep.
    fn base_cap(&self, role: usize) -> usize {
        let cap = if role < self.config.recent_roles {
            self.config.recent_bullet_cap
        } else {
            self.config.older_bullet_cap
        };
        cap.min(self.config.max_keywords_per_bullet)
    }

    /// Try to add one mention of `keywords[target]` to some bullet.
    /// Bullets holding the fewest keywords are tried first.
    fn inject_into_bullets(
        &mut self,
        doc: &mut ResumeDocument,
        keywords: &[Keyword],
        target: usize,
        tally: &mut Tally,
        log: &mut InjectionLog,
        cap_for: &dyn Fn(usize) -> usize,
    ) -> bool {
        let keyword = &keywords[target];
        let mut candidates: Vec<(usize, usize, usize)> = doc
            .bullets()
            .filter_map(|(location, text)| match location {
                TextLocation::Bullet { role, bullet } if !contains_whole_word(text, &keyword.term) => {
                    Some((keywords_in(text, keywords), role, bullet))
                }
                _ => None,
            })
            .collect();
        candidates.sort();

        for (_, role, bullet) in candidates {
            let location = TextLocation::Bullet { role, bullet };
            let Some(old) = doc.text_at(location) else {
                continue;
            };
            let (new, strategy) = self.rewrite_line(&old, &keyword.term, keyword.is_technical());
            match tally.check(
                keywords,
                target,
                &old,
                &new,
                Some(cap_for(role)),
                self.config.density_ceiling,
            ) {
                Ok(change) => {
                    tally.apply(&change);
                    doc.set_bullet(role, bullet, new);
                    log.push(InjectionRecord {
                        term: keyword.term.clone(),
                        location,
                        strategy,
                        mention_count_after: tally.counts[target],
                    });
                    debug!(term = %keyword.term, %location, ?strategy, "Injected keyword");
                    return true;
                }
                Err(refusal) => {
                    debug!(term = %keyword.term, %location, ?refusal, "Insertion refused");
                }
            }
        }
        false
    }

    /// Append the "Expertise includes …" clause to the summary.
    fn enhance_summary(
        &mut self,
        doc: &mut ResumeDocument,
        keywords: &[Keyword],
        plan: &SectionPlan,
        tally: &mut Tally,
        log: &mut InjectionLog,
    ) {
        if doc.summary.contains(CLAUSE_OPENER) {
            return;
        }

        let mut picks: Vec<usize> = plan
            .summary
            .iter()
            .copied()
            .filter(|&i| !contains_whole_word(&doc.summary, &keywords[i].term))
            .collect();
        for (i, keyword) in keywords.iter().enumerate() {
            if keyword.tier == Tier::High && tally.counts[i] == 0 && !picks.contains(&i) {
                picks.push(i);
            }
        }
        picks.retain(|&i| tally.counts[i] < keywords[i].target_mentions.max);
        picks.truncate(self.config.summary_clause_max.min(plan.budget.summary));

        let old = doc.summary.clone();
        // Longest clause that fits the budget
        while !picks.is_empty() {
            let terms: Vec<String> = picks.iter().map(|&i| keywords[i].term.clone()).collect();
            let clause = format!("{CLAUSE_OPENER} {}.", join_terms(&terms));
            let base = old.trim_end();
            let new = if base.is_empty() {
                clause
            } else if base.ends_with(['.', '!', '?']) {
                format!("{base} {clause}")
            } else {
                format!("{base}. {clause}")
            };

            match tally.check(keywords, picks[0], &old, &new, None, self.config.density_ceiling) {
                Ok(change) => {
                    tally.apply(&change);
                    doc.summary = new;
                    for &i in &picks {
                        log.push(InjectionRecord {
                            term: keywords[i].term.clone(),
                            location: TextLocation::Summary,
                            strategy: Strategy::SummaryClause,
                            mention_count_after: tally.counts[i],
                        });
                    }
                    debug!(terms = picks.len(), "Added summary clause");
                    return;
                }
                Err(refusal) => {
                    debug!(?refusal, terms = picks.len(), "Summary clause refused");
                    picks.pop();
                }
            }
        }
    }

    /// Is `term` already listed in the skills section?
    fn skills_contain(doc: &ResumeDocument, term: &str) -> bool {
        doc.skills
            .iter()
            .flat_map(|entry| entry.split(','))
            .any(|entry| contains_whole_word(entry, term))
    }

    /// Add one skills entry for `keywords[target]` if it fits.
    fn push_skill(
        &self,
        doc: &mut ResumeDocument,
        keywords: &[Keyword],
        target: usize,
        tally: &mut Tally,
        log: &mut InjectionLog,
    ) -> bool {
        let keyword = &keywords[target];
        if keyword.is_soft_skill()
            || doc.skills.len() >= self.config.skills_cap
            || Self::skills_contain(doc, &keyword.term)
        {
            return false;
        }
        let entry = self.classifier.skill_form(&keyword.term);
        let old = doc.skills.join(", ");
        let mut extended = doc.skills.clone();
        extended.push(entry);
        let new = extended.join(", ");

        match tally.check(keywords, target, &old, &new, None, self.config.density_ceiling) {
            Ok(change) => {
                tally.apply(&change);
                doc.skills = extended;
                log.push(InjectionRecord {
                    term: keyword.term.clone(),
                    location: TextLocation::Skills,
                    strategy: Strategy::SkillsList,
                    mention_count_after: tally.counts[target],
                });
                true
            }
            Err(refusal) => {
                debug!(term = %keyword.term, ?refusal, "Skills entry refused");
                false
            }
        }
    }

    /// Main entry point: bring every planned keyword as close to its target
    /// as the constraints allow. Returns a saturation diagnostic for each
    /// keyword left below its minimum.
    pub fn inject(
        &mut self,
        doc: &mut ResumeDocument,
        keywords: &[Keyword],
        plan: &SectionPlan,
        log: &mut InjectionLog,
    ) -> Vec<Diagnostic> {
        let mut tally = Tally::new(doc, keywords);
        let cap_limit = self.config.max_keywords_per_bullet;
        let base_caps: Vec<usize> = (0..doc.experience.len()).map(|role| self.base_cap(role)).collect();

        // 1. coverage-first rounds
        let max_min = plan
            .experience
            .iter()
            .map(|&i| keywords[i].target_mentions.min)
            .max()
            .unwrap_or(0);
        let cap_for = |role: usize| base_caps.get(role).copied().unwrap_or(cap_limit);
        for round in 1..=max_min {
            for &i in &plan.experience {
                let goal = round.min(keywords[i].target_mentions.min);
                if tally.counts[i] < goal {
                    self.inject_into_bullets(doc, keywords, i, &mut tally, log, &cap_for);
                }
            }
        }

        // 2. summary clause
        self.enhance_summary(doc, keywords, plan, &mut tally, log);

        // 3. skills top-up
        for &i in &plan.skills {
            self.push_skill(doc, keywords, i, &mut tally, log);
        }

        // 4. extra passes with a rising per-bullet cap
        let max_rounds = self.config.iteration_factor * doc.bullet_count().max(1);
        for pass in 1..=self.config.extra_passes {
            let pass_caps: Vec<usize> = base_caps.iter().map(|cap| (cap + pass).min(cap_limit)).collect();
            let cap_for = |role: usize| pass_caps.get(role).copied().unwrap_or(cap_limit);

            for _ in 0..max_rounds {
                let deficient: Vec<usize> = plan
                    .experience
                    .iter()
                    .copied()
                    .filter(|&i| tally.counts[i] < keywords[i].target_mentions.min)
                    .collect();
                let mut progressed = false;
                for i in deficient {
                    progressed |= self.inject_into_bullets(doc, keywords, i, &mut tally, log, &cap_for);
                }
                if !progressed {
                    break;
                }
            }
        }

        keywords
            .iter()
            .enumerate()
            .filter(|(i, k)| tally.counts[*i] < k.target_mentions.min)
            .map(|(i, k)| Diagnostic::InjectionSaturated {
                term: k.term.clone(),
                tier: k.tier,
                mentions: tally.counts[i],
                minimum: k.target_mentions.min,
            })
            .collect()
    }

    /// The single recovery pass: one mention for each keyword in `missing`
    /// (indices of keywords with no occurrences), trying bullets at the hard
    /// cap, then the summary, then the skills list. Returns the number of
    /// keywords recovered.
    pub fn recover(
        &mut self,
        doc: &mut ResumeDocument,
        keywords: &[Keyword],
        missing: &[usize],
        log: &mut InjectionLog,
    ) -> usize {
        let mut tally = Tally::new(doc, keywords);
        let hard_cap = self.config.max_keywords_per_bullet;
        let mut recovered = 0;

        for &i in missing {
            if tally.counts[i] > 0 {
                continue;
            }
            let keyword = &keywords[i];
            if self.inject_into_bullets(doc, keywords, i, &mut tally, log, &|_: usize| hard_cap) {
                recovered += 1;
                continue;
            }

            let old = doc.summary.clone();
            if !old.trim().is_empty() {
                let (new, strategy) = self.rewrite_line(&old, &keyword.term, keyword.is_technical());
                if let Ok(change) =
                    tally.check(keywords, i, &old, &new, None, self.config.density_ceiling)
                {
                    tally.apply(&change);
                    doc.summary = new;
                    log.push(InjectionRecord {
                        term: keyword.term.clone(),
                        location: TextLocation::Summary,
                        strategy,
                        mention_count_after: tally.counts[i],
                    });
                    recovered += 1;
                    continue;
                }
            }

            if self.push_skill(doc, keywords, i, &mut tally, log) {
                recovered += 1;
            } else {
                debug!(term = %keyword.term, "Recovery found no place for keyword");
            }
        }
        recovered
    }
}

/// Byte position of the first comma that separates clauses (followed by a
/// space, not inside a number like "1,000").
fn first_clause_comma(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    line.match_indices(',')
        .map(|(pos, _)| pos)
        .find(|&pos| pos > 0 && bytes.get(pos + 1) == Some(&b' ') && !bytes[pos - 1].is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::models::{Category, MentionRange};
    use crate::resume::models::Experience;
    use crate::tailor::allocator::allocate;
    use crate::tailor::connectors::RotatingConnectors;

    fn engine() -> InjectionEngine {
        InjectionEngine::new(
            TailorConfig::default(),
            Arc::new(Classifier::default()),
            Box::new(RotatingConnectors::default()),
        )
    }

    fn keyword(term: &str, tier: Tier, category: Category, range: MentionRange) -> Keyword {
        Keyword {
            term: term.to_string(),
            categories: [category].into(),
            tier,
            frequency_in_jd: 1,
            score: 1.0,
            target_mentions: range,
            mandatory: true,
        }
    }

    fn resume() -> ResumeDocument {
        let role = |company: &str, bullets: &[&str]| Experience {
            company: company.to_string(),
            title: "Software Engineer".to_string(),
            dates: "2019 - 2022".to_string(),
            bullets: bullets.iter().map(|b| b.to_string()).collect(),
        };
        ResumeDocument {
            summary: "Backend engineer with eight years of experience shipping reliable services for fintech and retail customers.".to_string(),
            experience: vec![
                role("Acme", &[
                    "Built the payment reconciliation service handling two million transactions a day across four regions.",
                    "Designed an internal deployment workflow, cutting release time from two days to forty minutes.",
                    "Mentored four junior engineers through weekly pairing sessions and structured code walkthroughs.",
                    "Wrote the onboarding guide that new hires still follow during their first two weeks on the team.",
                ]),
                role("Globex", &[
                    "Migrated legacy batch jobs to streaming consumers, reducing settlement lag by ninety percent.",
                    "Led the incident review process and wrote the runbooks still used by the on-call rotation.",
                    "Improved query performance on the reporting database by rewriting the slowest report generators.",
                    "Ran quarterly capacity planning with finance and kept infrastructure spend flat during rapid growth.",
                ]),
                role("Initech", &[
                    "Developed internal tooling for the finance team to automate monthly close tasks and audits.",
                    "Maintained the customer billing portal and resolved escalated support tickets within one day.",
                    "Partnered with product managers to scope quarterly roadmap items and estimate engineering effort.",
                    "Handled vendor evaluations for the payments platform and wrote the final recommendation memo.",
                ]),
                role("Umbrella", &[
                    "Supported the warehouse inventory system and fixed long-standing bugs in the nightly export jobs.",
                    "Created dashboards that gave the operations team daily visibility into order fulfilment delays.",
                    "Documented the legacy order routing rules so the support team could answer customer questions.",
                    "Trained two new analysts on the reporting stack and reviewed their first production changes.",
                ]),
            ],
            skills: vec!["Go".to_string(), "SQL".to_string()],
            ..ResumeDocument::default()
        }
    }

    #[test]
    fn test_rewrite_after_action_verb() {
        let mut engine = engine();
        let (line, strategy) = engine.rewrite_line("Built the ledger service.", "Kafka", true);
        assert_eq!(strategy, Strategy::ActionVerb);
        assert_eq!(line, "Built the Kafka-based ledger service.");

        let (line, _) = engine.rewrite_line("Designed a schema registry.", "AWS", true);
        assert_eq!(line, "Designed an AWS-based schema registry.");
    }

    #[test]
    fn test_rewrite_connector_strategies() {
        let mut engine = engine();
        let (line, strategy) =
            engine.rewrite_line("Handled billing, cutting costs by 1,000 dollars.", "Stakeholder Management", false);
        assert_eq!(strategy, Strategy::BeforeComma);
        assert_eq!(line, "Handled billing leveraging Stakeholder Management, cutting costs by 1,000 dollars.");

        let (line, strategy) = engine.rewrite_line("Handled billing end to end.", "Terraform", true);
        assert_eq!(strategy, Strategy::BeforePeriod);
        assert_eq!(line, "Handled billing end to end utilizing Terraform.");

        let (line, strategy) = engine.rewrite_line("Handled billing end to end", "Terraform", true);
        assert_eq!(strategy, Strategy::Append);
        assert_eq!(line, "Handled billing end to end, through Terraform");
    }

    #[test]
    fn test_bullet_with_term_is_never_a_target() {
        let mut engine = engine();
        let mut doc = resume();
        doc.experience[0].bullets[0] = "Deployed Kubernetes clusters for the payment service.".to_string();
        let keywords = vec![keyword("Kubernetes", Tier::High, Category::CloudDevOps, MentionRange::new(3, 5))];
        let plan = allocate(&keywords, &TailorConfig::default());
        let mut log = InjectionLog::new();
        engine.inject(&mut doc, &keywords, &plan, &mut log);

        for record in log.records() {
            assert_ne!(record.location, TextLocation::Bullet { role: 0, bullet: 0 });
        }
        assert_eq!(doc.experience[0].bullets[0], "Deployed Kubernetes clusters for the payment service.");
    }

    #[test]
    fn test_inject_reaches_targets_across_bullets() {
        let mut engine = engine();
        let mut doc = resume();
        let before = doc.clone();
        let keywords = vec![
            keyword("Python", Tier::High, Category::Language, MentionRange::new(3, 5)),
            keyword("AWS", Tier::High, Category::CloudDevOps, MentionRange::new(3, 5)),
            keyword("Kubernetes", Tier::High, Category::CloudDevOps, MentionRange::new(3, 5)),
            keyword("Stakeholder Management", Tier::Medium, Category::SoftSkill, MentionRange::new(2, 4)),
        ];
        let plan = allocate(&keywords, &TailorConfig::default());
        let mut log = InjectionLog::new();
        let saturated = engine.inject(&mut doc, &keywords, &plan, &mut log);
        assert!(saturated.is_empty(), "{saturated:?}");

        let rendered = render_text(&doc);
        for k in &keywords {
            let count = count_whole_word(&rendered, &k.term);
            assert!(count >= k.target_mentions.min && count <= k.target_mentions.max, "{}: {count}", k.term);
        }
        for term in ["Python", "AWS", "Kubernetes"] {
            let bullets = doc.bullets().filter(|(_, b)| contains_whole_word(b, term)).count();
            assert!(bullets >= 2, "{term} in {bullets} bullets");
        }
        assert_eq!(doc.role_headers(), before.role_headers());
    }

    #[test]
    fn test_second_run_inserts_nothing() {
        let keywords = vec![
            keyword("Python", Tier::High, Category::Language, MentionRange::new(3, 5)),
            keyword("Terraform", Tier::Medium, Category::CloudDevOps, MentionRange::new(2, 4)),
            keyword("Jira", Tier::Low, Category::Methodology, MentionRange::new(1, 2)),
        ];
        let plan = allocate(&keywords, &TailorConfig::default());
        let mut doc = resume();
        engine().inject(&mut doc, &keywords, &plan, &mut InjectionLog::new());
        let once = doc.clone();

        let mut log = InjectionLog::new();
        engine().inject(&mut doc, &keywords, &plan, &mut log);
        assert!(log.is_empty(), "{:?}", log.records());
        assert_eq!(doc, once);
    }

    #[test]
    fn test_density_ceiling_refuses_insertions() {
        let config = TailorConfig {
            density_ceiling: 0.01,
            ..TailorConfig::default()
        };
        let mut engine = InjectionEngine::new(
            config,
            Arc::new(Classifier::default()),
            Box::new(RotatingConnectors::default()),
        );
        let keywords: Vec<Keyword> = ["Python", "Rust", "Scala", "Kotlin", "Elixir"]
            .iter()
            .map(|t| keyword(t, Tier::High, Category::Language, MentionRange::new(3, 5)))
            .collect();
        let plan = allocate(&keywords, &TailorConfig::default());
        let mut doc = resume();
        let mut log = InjectionLog::new();
        let saturated = engine.inject(&mut doc, &keywords, &plan, &mut log);

        let words = document_word_count(&doc);
        let rendered = render_text(&doc);
        let occurrences: usize = keywords.iter().map(|k| count_whole_word(&rendered, &k.term)).sum();
        assert!(occurrences as f64 / words as f64 <= 0.01);
        assert!(!saturated.is_empty());
    }

    #[test]
    fn test_summary_clause_and_skills() {
        let mut engine = engine();
        let mut doc = resume();
        let keywords = vec![
            keyword("Python", Tier::High, Category::Language, MentionRange::new(3, 5)),
            keyword("PostgreSQL", Tier::High, Category::DataTool, MentionRange::new(3, 5)),
            keyword("ci/cd", Tier::Low, Category::CloudDevOps, MentionRange::new(1, 2)),
        ];
        let plan = allocate(&keywords, &TailorConfig::default());
        engine.inject(&mut doc, &keywords, &plan, &mut InjectionLog::new());

        assert!(doc.summary.contains("Expertise includes Python and PostgreSQL."));
        assert!(doc.skills.contains(&"Python".to_string()));
        assert!(doc.skills.contains(&"CI/CD".to_string()));
        assert_eq!(&doc.skills[..2], &["Go".to_string(), "SQL".to_string()]);
    }

    #[test]
    fn test_recover_places_missing_terms() {
        let mut engine = engine();
        let mut doc = resume();
        let keywords = vec![
            keyword("Snowflake", Tier::Low, Category::DataTool, MentionRange::new(1, 2)),
            keyword("Negotiation", Tier::Low, Category::SoftSkill, MentionRange::new(1, 2)),
        ];
        let mut log = InjectionLog::new();
        let recovered = engine.recover(&mut doc, &keywords, &[0, 1], &mut log);
        assert_eq!(recovered, 2);
        let rendered = render_text(&doc);
        assert!(contains_whole_word(&rendered, "Snowflake"));
        assert!(contains_whole_word(&rendered, "Negotiation"));
    }

    #[test]
    fn test_join_terms() {
        let terms = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(join_terms(&terms(&["A"])), "A");
        assert_eq!(join_terms(&terms(&["A", "B"])), "A and B");
        assert_eq!(join_terms(&terms(&["A", "B", "C"])), "A, B, and C");
    }
}
