// Unit tests for keyword extraction.
//
// Exercises the mandatory-term matcher, de-clustering, tier assignment, the
// learned store, the TTL cache, and the caching decorator (a cache hit must
// do no scoring work at all).

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use atsfit::config::TailorConfig;
use atsfit::jd::{JobDescription, StructureKind};
use atsfit::keywords::cache::{cache_key, content_fingerprint};
use atsfit::keywords::declutter::Declutterer;
use atsfit::keywords::mandatory::find_mandatory;
use atsfit::keywords::{
    CachingExtractor, Category, ClassificationRuleset, Classifier, FrequencyExtractor,
    InMemoryLearnedStore, KeywordCache, KeywordExtractor, LearnedKeyword, LearnedKeywordStore, Tier,
};

const JD: &str = "We are hiring a backend engineer to join our payments platform group in Berlin.\nRequirements: Python, AWS, Kubernetes, and strong stakeholder management.";

fn extractor(learned: Arc<dyn LearnedKeywordStore>) -> FrequencyExtractor {
    FrequencyExtractor::new(Arc::new(Classifier::default()), learned, TailorConfig::default())
}

fn jd(text: &str) -> JobDescription {
    JobDescription::new(text, None, 15_000)
}

/// Learned store that counts lookups, to prove cache hits skip scoring.
struct CountingStore {
    inner: InMemoryLearnedStore,
    lookups: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryLearnedStore::new(100),
            lookups: AtomicUsize::new(0),
        }
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl LearnedKeywordStore for CountingStore {
    fn get(&self, term: &str) -> Option<LearnedKeyword> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get(term)
    }

    fn set(&self, entry: LearnedKeyword) {
        self.inner.set(entry);
    }

    fn increment(&self, term: &str, categories: &BTreeSet<Category>, now: chrono::DateTime<Utc>) {
        self.inner.increment(term, categories, now);
    }

    fn snapshot(&self) -> Vec<LearnedKeyword> {
        self.inner.snapshot()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

// ============================================================
// Mandatory terms and tiers
// ============================================================

#[test]
fn mandatory_terms_found_in_comma_list() {
    let classifier = Classifier::default();
    let hits = find_mandatory(&classifier, "Python, AWS, Kubernetes, and strong stakeholder management");
    let terms: Vec<&str> = hits.iter().map(|h| h.term.as_str()).collect();
    assert!(terms.contains(&"Python"));
    assert!(terms.contains(&"AWS"));
    assert!(terms.contains(&"Kubernetes"));
    assert!(terms.contains(&"Stakeholder Management"));
}

#[test]
fn longer_mandatory_term_subsumes_shorter() {
    let classifier = Classifier::default();
    let hits = find_mandatory(&classifier, "Experience with Apache Spark and Airflow");
    let terms: Vec<&str> = hits.iter().map(|h| h.term.as_str()).collect();
    assert!(terms.contains(&"Apache Spark"));
    assert!(!terms.contains(&"Spark"));
    assert!(terms.contains(&"Airflow"));
}

#[test]
fn mandatory_technical_terms_are_high_tier() {
    let learned = Arc::new(InMemoryLearnedStore::new(100));
    let extraction = extractor(learned).extract(&jd(JD)).unwrap();

    for term in ["Python", "AWS", "Kubernetes"] {
        let keyword = extraction
            .keywords
            .iter()
            .find(|k| k.term == term)
            .unwrap_or_else(|| panic!("{term} missing from keywords"));
        assert!(keyword.mandatory);
        assert_eq!(keyword.tier, Tier::High, "{term} should be high tier");
        assert_eq!(keyword.target_mentions.min, 3);
    }
}

#[test]
fn soft_skills_never_reach_high_tier() {
    let learned = Arc::new(InMemoryLearnedStore::new(100));
    let extraction = extractor(learned).extract(&jd(JD)).unwrap();

    let soft = extraction
        .keywords
        .iter()
        .find(|k| k.term == "Stakeholder Management")
        .unwrap();
    assert!(soft.categories.contains(&Category::SoftSkill));
    assert_eq!(soft.tier, Tier::Medium);
    assert!(extraction.by_tier(Tier::High).all(|k| !k.is_soft_skill()));
}

#[test]
fn keywords_are_ordered_high_to_low() {
    let learned = Arc::new(InMemoryLearnedStore::new(100));
    let extraction = extractor(learned).extract(&jd(JD)).unwrap();
    let tiers: Vec<Tier> = extraction.keywords.iter().map(|k| k.tier).collect();
    let mut sorted = tiers.clone();
    sorted.sort();
    assert_eq!(tiers, sorted);
}

#[test]
fn filler_words_are_not_keywords() {
    let learned = Arc::new(InMemoryLearnedStore::new(100));
    let extraction = extractor(learned).extract(&jd(JD)).unwrap();
    for filler in ["requirements", "strong", "the", "and", "join"] {
        assert!(
            !extraction.keywords.iter().any(|k| k.term.eq_ignore_ascii_case(filler)),
            "{filler} should not be a keyword"
        );
    }
}

#[test]
fn short_jd_yields_no_keywords() {
    let learned = Arc::new(InMemoryLearnedStore::new(100));
    let extraction = extractor(learned).extract(&jd("Python developer")).unwrap();
    assert!(extraction.is_empty());
}

#[test]
fn keyword_count_is_capped_but_keeps_mandatory() {
    let config = TailorConfig {
        max_keywords: 2,
        ..TailorConfig::default()
    };
    let extractor = FrequencyExtractor::new(
        Arc::new(Classifier::default()),
        Arc::new(InMemoryLearnedStore::new(100)),
        config,
    );
    let extraction = extractor.extract(&jd(JD)).unwrap();
    // four mandatory hits survive a cap of two
    assert_eq!(extraction.keywords.iter().filter(|k| k.mandatory).count(), 4);
    assert_eq!(extraction.keywords.len(), 4);
}

// ============================================================
// De-clustering
// ============================================================

#[test]
fn clustered_tokens_are_split() {
    let classifier = Classifier::default();
    let declutterer = Declutterer::new(&classifier);
    assert_eq!(
        declutterer.declutter("Skills: pythondjangokubernetes"),
        "Skills: python django kubernetes"
    );
    assert_eq!(declutterer.declutter("ReactRedux"), "React Redux");
    assert_eq!(declutterer.declutter("python.django"), "python django");
}

#[test]
fn domain_suffixes_do_not_become_candidates() {
    let classifier = Classifier::default();
    let declutterer = Declutterer::new(&classifier);
    assert_eq!(
        declutterer.declutter("Learn more at understanding.com or stripe.io."),
        "Learn more at understanding or stripe."
    );

    let text = "Requirements: Python, AWS, and Kubernetes. Apply through northwind.com, \
                questions to careers.net, portfolio on acme.io.";
    let extraction = extractor(Arc::new(InMemoryLearnedStore::new(100)))
        .extract(&jd(text))
        .unwrap();
    for fragment in ["com", "net", "io"] {
        assert!(
            !extraction.keywords.iter().any(|k| k.term.eq_ignore_ascii_case(fragment)),
            "{fragment} extracted as a keyword"
        );
    }
}

#[test]
fn known_terms_are_not_split() {
    let classifier = Classifier::default();
    let declutterer = Declutterer::new(&classifier);
    assert_eq!(declutterer.declutter("JavaScript and Node.js"), "JavaScript and Node.js");
    assert!(declutterer.split_token("PostgreSQL").is_none());
}

// ============================================================
// Ruleset
// ============================================================

#[test]
fn custom_ruleset_loads_from_json() {
    let json = r#"{
        "version": 7,
        "rules": [
            {"category": "language", "weight": 1.5, "mandatory": true, "terms": ["Zig", "Odin"]}
        ]
    }"#;
    let classifier = ClassificationRuleset::from_json(json).unwrap().compile();
    assert_eq!(classifier.version(), 7);
    assert!(classifier.is_known("zig"));
    assert!(classifier.classify("ZIG").contains(&Category::Language));
    assert!(!classifier.is_known("Python"));
}

#[test]
fn ruleset_without_rules_is_rejected() {
    let result = ClassificationRuleset::from_json(r#"{"version": 1, "rules": []}"#);
    assert!(result.is_err());
}

#[test]
fn skill_form_capitalizes_unknown_terms() {
    let classifier = Classifier::default();
    assert_eq!(classifier.skill_form("postgresql"), "PostgreSQL");
    assert_eq!(classifier.skill_form("payment api"), "Payment API");
}

// ============================================================
// Learned store
// ============================================================

#[test]
fn learned_store_evicts_least_recently_seen() {
    let store = InMemoryLearnedStore::new(2);
    let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let none = BTreeSet::new();
    store.increment("Python", &none, t0);
    store.increment("AWS", &none, t0 + Duration::minutes(1));
    store.increment("Kafka", &none, t0 + Duration::minutes(2));

    assert_eq!(store.len(), 2);
    assert!(store.get("python").is_none());
    assert!(store.get("aws").is_some());
    assert_eq!(store.get("KAFKA").unwrap().frequency, 1);
}

#[test]
fn learned_boost_is_capped() {
    let store = InMemoryLearnedStore::new(10);
    let now = Utc::now();
    for _ in 0..5 {
        store.increment("Rust", &BTreeSet::from([Category::Language]), now);
    }
    assert!((store.boost("rust", 2.0) - 1.5).abs() < 1e-9);
    assert!((store.boost("rust", 1.3) - 1.3).abs() < 1e-9);
    assert!((store.boost("unknown", 2.0) - 1.0).abs() < 1e-9);
}

#[test]
fn extraction_feeds_learned_store() {
    let learned = Arc::new(InMemoryLearnedStore::new(100));
    extractor(learned.clone()).extract(&jd(JD)).unwrap();
    let python = learned.get("python").unwrap();
    assert_eq!(python.frequency, 1);
    assert!(python.categories.contains(&Category::Language));
    let kubernetes = learned.get("kubernetes").unwrap();
    assert!(kubernetes.categories.contains(&Category::CloudDevOps));
    let soft = learned.get("stakeholder management").unwrap();
    assert!(soft.categories.contains(&Category::SoftSkill));
}

// ============================================================
// Cache
// ============================================================

#[test]
fn cache_key_prefers_source_url() {
    let with_url = JobDescription::new(JD, Some("https://jobs.example/42".to_string()), 15_000);
    assert_eq!(cache_key(&with_url), "url:https://jobs.example/42");

    let without = jd(JD);
    let key = cache_key(&without);
    assert!(key.starts_with("sha256:"));
    assert!(key.ends_with(&format!(":{}", without.clean_text().len())));
    assert_eq!(key, content_fingerprint(without.clean_text()));
}

#[test]
fn cache_entries_expire_after_ttl() {
    let cache = KeywordCache::new(Duration::minutes(30), 10);
    let stored = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    cache.set_at("k", Vec::new(), StructureKind::Bullets, stored);

    assert!(cache.get_at("k", stored + Duration::minutes(29)).is_some());
    assert!(cache.get_at("k", stored + Duration::minutes(31)).is_none());
    assert!(cache.is_empty());
}

#[test]
fn cache_evicts_oldest_past_capacity() {
    let cache = KeywordCache::new(Duration::minutes(30), 2);
    let t0 = Utc::now();
    cache.set_at("a", Vec::new(), StructureKind::RawText, t0);
    cache.set_at("b", Vec::new(), StructureKind::RawText, t0 + Duration::seconds(1));
    cache.set_at("c", Vec::new(), StructureKind::RawText, t0 + Duration::seconds(2));

    assert_eq!(cache.len(), 2);
    assert!(cache.get_at("a", t0 + Duration::seconds(3)).is_none());
    assert!(cache.get_at("c", t0 + Duration::seconds(3)).is_some());
}

#[test]
fn superseded_extraction_is_discarded() {
    let cache = KeywordCache::new(Duration::minutes(30), 10);
    let first = cache.begin("job");
    let second = cache.begin("job");

    assert!(!cache.complete(first, Vec::new(), StructureKind::Narrative));
    assert!(cache.is_empty());
    assert!(cache.complete(second, Vec::new(), StructureKind::Sections));
    assert_eq!(cache.get("job").unwrap().structure, StructureKind::Sections);
}

#[test]
fn cache_hit_does_no_rescoring() {
    let store = Arc::new(CountingStore::new());
    let cache = Arc::new(KeywordCache::new(Duration::minutes(30), 10));
    let caching = CachingExtractor::new(extractor(store.clone()), cache.clone());
    let input = jd(JD);

    let first = caching.extract(&input).unwrap();
    assert!(!first.from_cache);
    let lookups_after_first = store.lookups();
    assert!(lookups_after_first > 0);
    assert_eq!(cache.len(), 1);

    let second = caching.extract(&input).unwrap();
    assert!(second.from_cache);
    assert_eq!(store.lookups(), lookups_after_first);

    let first_terms: Vec<&str> = first.keywords.iter().map(|k| k.term.as_str()).collect();
    let second_terms: Vec<&str> = second.keywords.iter().map(|k| k.term.as_str()).collect();
    assert_eq!(first_terms, second_terms);
}
