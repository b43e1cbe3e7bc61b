// Unit tests for the injection engine.
//
// Line-level rewriting (action verb, before comma, before period, append),
// connector selection, and the engine-level guarantees: role headers never
// change, bullets never exceed the keyword cap, density stays under the
// ceiling, and the recovery pass falls back to the summary.

use std::sync::Arc;

use atsfit::config::TailorConfig;
use atsfit::keywords::{Category, Classifier, Keyword, MentionRange, Tier};
use atsfit::resume::{Experience, ResumeDocument, TextLocation};
use atsfit::tailor::connectors::{strategy_for, SeededConnectors, CONNECTORS};
use atsfit::tailor::validate::{role_headers_unchanged, validate};
use atsfit::tailor::{allocate, InjectionEngine, InjectionLog, RotatingConnectors, Strategy};
use atsfit::text::contains_whole_word;

fn engine() -> InjectionEngine {
    InjectionEngine::new(
        TailorConfig::default(),
        Arc::new(Classifier::default()),
        Box::new(RotatingConnectors::default()),
    )
}

fn keyword(term: &str, tier: Tier, category: Category) -> Keyword {
    let config = TailorConfig::default();
    Keyword {
        term: term.to_string(),
        categories: [category].into(),
        tier,
        frequency_in_jd: 1,
        score: 1.0,
        target_mentions: config.mentions_for(tier),
        mandatory: true,
    }
}

fn resume() -> ResumeDocument {
    let role = |company: &str, title: &str, dates: &str, bullets: &[&str]| Experience {
        company: company.to_string(),
        title: title.to_string(),
        dates: dates.to_string(),
        bullets: bullets.iter().map(|b| b.to_string()).collect(),
    };
    ResumeDocument {
        summary: "Backend engineer with eight years of experience building payment systems, mentoring teams, and running production services for fintech and retail customers across Europe.".to_string(),
        experience: vec![
            role("Northwind", "Senior Engineer", "2021 - Present", &[
                "Built the settlement service that reconciles card payments every night for the finance and treasury teams.",
                "Designed an alerting workflow for the on-call rotation, cutting incident response time by half within one quarter.",
                "Mentored five engineers through weekly pairing sessions, design reviews, and structured code walkthroughs.",
                "Reduced monthly infrastructure spend by a third by consolidating idle clusters and rightsizing batch workers.",
            ]),
            role("Globex", "Software Engineer", "2018 - 2021", &[
                "Migrated legacy batch jobs to streaming consumers, reducing settlement lag from hours to a few minutes.",
                "Led the incident review process and wrote the runbooks still used by the operations group today.",
                "Improved query performance on the reporting database by rewriting the slowest nightly report generators.",
            ]),
            role("Initech", "Junior Developer", "2016 - 2018", &[
                "Maintained the internal billing portal used by three hundred account managers across four regional offices.",
                "Wrote integration tests for the invoicing module, catching regressions before each monthly release went out.",
            ]),
        ],
        skills: vec!["Go".to_string(), "Git".to_string()],
        ..ResumeDocument::default()
    }
}

fn keywords() -> Vec<Keyword> {
    vec![
        keyword("Python", Tier::High, Category::Language),
        keyword("Kafka", Tier::High, Category::DataTool),
        keyword("Terraform", Tier::Medium, Category::CloudDevOps),
        keyword("Stakeholder Management", Tier::Medium, Category::SoftSkill),
        keyword("Jira", Tier::Low, Category::Methodology),
    ]
}

// ============================================================
// Line rewriting
// ============================================================

#[test]
fn action_verb_takes_compound_modifier() {
    let (line, strategy) =
        engine().rewrite_line("Built data pipelines for the analytics team", "Kafka", true);
    assert_eq!(line, "Built Kafka-based data pipelines for the analytics team");
    assert_eq!(strategy, Strategy::ActionVerb);
}

#[test]
fn article_agrees_with_inserted_term() {
    let line = "Designed an alerting workflow for on-call engineers";
    let (with_kafka, _) = engine().rewrite_line(line, "Kafka", true);
    assert_eq!(with_kafka, "Designed a Kafka-based alerting workflow for on-call engineers");
    let (with_aws, _) = engine().rewrite_line(line, "AWS", true);
    assert_eq!(with_aws, "Designed an AWS-based alerting workflow for on-call engineers");
    let (with_the, _) = engine().rewrite_line("Led the migration to managed databases", "Terraform", true);
    assert_eq!(with_the, "Led the Terraform-based migration to managed databases");
}

#[test]
fn multi_word_terms_use_connectors() {
    let (line, strategy) = engine().rewrite_line(
        "Built data pipelines for the analytics team.",
        "Apache Spark",
        true,
    );
    assert_eq!(line, "Built data pipelines for the analytics team leveraging Apache Spark.");
    assert_eq!(strategy, Strategy::BeforePeriod);
}

#[test]
fn soft_skills_go_before_first_clause_comma() {
    let (line, strategy) = engine().rewrite_line(
        "Built the vendor onboarding process, cutting setup time by half.",
        "Stakeholder Management",
        false,
    );
    assert_eq!(
        line,
        "Built the vendor onboarding process leveraging Stakeholder Management, cutting setup time by half."
    );
    assert_eq!(strategy, Strategy::BeforeComma);
}

#[test]
fn thousands_separator_is_not_a_clause_comma() {
    let (line, strategy) =
        engine().rewrite_line("Handled 1,000 support tickets per week.", "Zendesk", true);
    assert_eq!(line, "Handled 1,000 support tickets per week leveraging Zendesk.");
    assert_eq!(strategy, Strategy::BeforePeriod);
}

#[test]
fn unpunctuated_line_gets_appended_clause() {
    let (line, strategy) = engine().rewrite_line("Handled escalations;", "Jira", true);
    assert_eq!(line, "Handled escalations, leveraging Jira");
    assert_eq!(strategy, Strategy::Append);
}

#[test]
fn default_strategy_rotates_connectors() {
    let mut engine = InjectionEngine::new(
        TailorConfig::default(),
        Arc::new(Classifier::default()),
        strategy_for(None),
    );
    let picked: Vec<String> = (0..3)
        .map(|_| engine.rewrite_line("Handled escalations", "Jira", true).0)
        .collect();
    for (line, connector) in picked.iter().zip(CONNECTORS) {
        assert_eq!(line, &format!("Handled escalations, {connector} Jira"));
    }
}

#[test]
fn seeded_connectors_are_reproducible() {
    let run = || {
        let mut engine = InjectionEngine::new(
            TailorConfig::default(),
            Arc::new(Classifier::default()),
            Box::new(SeededConnectors::new(42)),
        );
        (0..8)
            .map(|_| engine.rewrite_line("Handled escalations", "Jira", true).0)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

// ============================================================
// Engine guarantees
// ============================================================

#[test]
fn inject_preserves_role_headers_and_caps() {
    let config = TailorConfig::default();
    let original = resume();
    let keywords = keywords();
    let plan = allocate(&keywords, &config);

    let mut doc = original.clone();
    let mut log = InjectionLog::new();
    engine().inject(&mut doc, &keywords, &plan, &mut log);

    assert!(!log.is_empty());
    assert!(role_headers_unchanged(&original, &doc));
    assert_eq!(doc.contact, original.contact);
    assert_eq!(doc.education, original.education);

    for (_, text) in doc.bullets() {
        let held = keywords
            .iter()
            .filter(|k| contains_whole_word(text, &k.term))
            .count();
        assert!(held <= config.max_keywords_per_bullet, "overloaded bullet: {text}");
    }

    let report = validate(&doc, &keywords, &config);
    assert!(report.density <= config.density_ceiling, "density {}", report.density);
    for m in &report.mentions {
        assert!(m.mentions <= m.maximum, "{} over its maximum", m.term);
    }
}

#[test]
fn every_logged_insertion_is_visible_in_the_document() {
    let config = TailorConfig::default();
    let keywords = keywords();
    let plan = allocate(&keywords, &config);

    let mut doc = resume();
    let mut log = InjectionLog::new();
    engine().inject(&mut doc, &keywords, &plan, &mut log);

    for record in log.records() {
        let text = doc.text_at(record.location).unwrap();
        assert!(
            contains_whole_word(&text, &record.term),
            "{} not found at {}",
            record.term,
            record.location
        );
    }

    // mention counts only ever grow
    for (term, records) in log.by_term() {
        let counts: Vec<usize> = records.iter().map(|r| r.mention_count_after).collect();
        assert!(counts.windows(2).all(|w| w[0] < w[1]), "{term}: {counts:?}");
    }
}

#[test]
fn bullets_with_typographic_punctuation_are_not_retargeted() {
    let config = TailorConfig::default();
    let keywords = vec![keyword("Kubernetes", Tier::High, Category::CloudDevOps)];
    let plan = allocate(&keywords, &config);

    let mut doc = resume();
    doc.experience[0].bullets[0] =
        "Scaled Kubernetes\u{2014}on-prem and cloud\u{2014}for the settlement platform serving card payments.".to_string();
    doc.experience[0].bullets[1] =
        "Ran \u{201c}Kubernetes\u{201d} office hours for product teams, covering rollouts and debugging.".to_string();
    doc.experience[0].bullets[2] =
        "Tuned Kubernetes\u{2019}s scheduler for the batch workers, trimming idle capacity every night.".to_string();
    let seeded = doc.clone();
    assert_eq!(validate(&doc, &keywords, &config).mentions[0].mentions, 3);

    let mut log = InjectionLog::new();
    engine().inject(&mut doc, &keywords, &plan, &mut log);

    for bullet in 0..3 {
        assert_eq!(doc.experience[0].bullets[bullet], seeded.experience[0].bullets[bullet]);
        assert!(log
            .records()
            .iter()
            .all(|r| r.location != TextLocation::Bullet { role: 0, bullet }));
    }
    let report = validate(&doc, &keywords, &config);
    assert!(report.mentions[0].mentions <= report.mentions[0].maximum);
}

#[test]
fn soft_skills_never_enter_skills_section() {
    let config = TailorConfig::default();
    let keywords = keywords();
    let plan = allocate(&keywords, &config);

    let mut doc = resume();
    let mut log = InjectionLog::new();
    engine().inject(&mut doc, &keywords, &plan, &mut log);

    assert!(!doc.skills.iter().any(|s| s.contains("Stakeholder")));
    assert!(log
        .records()
        .iter()
        .filter(|r| r.location == TextLocation::Skills)
        .all(|r| r.strategy == Strategy::SkillsList));
}

#[test]
fn engine_output_is_a_fixed_point() {
    let config = TailorConfig::default();
    let keywords = keywords();
    let plan = allocate(&keywords, &config);

    let mut doc = resume();
    let mut log = InjectionLog::new();
    engine().inject(&mut doc, &keywords, &plan, &mut log);

    let once = doc.clone();
    let mut second_log = InjectionLog::new();
    engine().inject(&mut doc, &keywords, &plan, &mut second_log);
    assert!(second_log.is_empty());
    assert_eq!(doc, once);
}

#[test]
fn recovery_falls_back_to_summary() {
    let doc_without_bullets = ResumeDocument {
        summary: resume().summary,
        ..ResumeDocument::default()
    };
    let keywords = vec![keyword("Kafka", Tier::High, Category::DataTool)];

    let mut doc = doc_without_bullets.clone();
    let mut log = InjectionLog::new();
    let recovered = engine().recover(&mut doc, &keywords, &[0], &mut log);

    assert_eq!(recovered, 1);
    assert_eq!(log.len(), 1);
    assert_eq!(log.records()[0].location, TextLocation::Summary);
    assert_eq!(log.records()[0].strategy, Strategy::BeforeComma);
    assert!(doc.summary.contains("payment systems leveraging Kafka, mentoring"));
}

#[test]
fn recovery_never_lowers_score_or_mentions() {
    for ceiling in [0.005, 0.01, 0.02, 0.03, 0.05] {
        let config = TailorConfig {
            density_ceiling: ceiling,
            ..TailorConfig::default()
        };
        let keywords = keywords();
        let plan = allocate(&keywords, &config);
        let mut engine = InjectionEngine::new(
            config.clone(),
            Arc::new(Classifier::default()),
            Box::new(RotatingConnectors::default()),
        );

        let mut doc = resume();
        engine.inject(&mut doc, &keywords, &plan, &mut InjectionLog::new());
        let before = validate(&doc, &keywords, &config);

        let mut log = InjectionLog::new();
        let recovered = engine.recover(&mut doc, &keywords, &before.missing_indices(), &mut log);
        let after = validate(&doc, &keywords, &config);

        assert_eq!(recovered, log.len(), "ceiling {ceiling}");
        assert!(
            after.match_score >= before.match_score,
            "ceiling {ceiling}: {} < {}",
            after.match_score,
            before.match_score
        );
        for (b, a) in before.mentions.iter().zip(&after.mentions) {
            assert!(a.mentions >= b.mentions, "ceiling {ceiling}: {} dropped", a.term);
        }
        assert!(after.density <= ceiling, "ceiling {ceiling}: density {}", after.density);
    }
}

#[test]
fn recovery_skips_keywords_already_present() {
    let keywords = vec![keyword("Kafka", Tier::High, Category::DataTool)];
    let mut doc = resume();
    doc.experience[0].bullets[0].push_str(" Consumed Kafka topics.");
    let before = doc.clone();

    let mut log = InjectionLog::new();
    let recovered = engine().recover(&mut doc, &keywords, &[0], &mut log);
    assert_eq!(recovered, 0);
    assert!(log.is_empty());
    assert_eq!(doc, before);
}
