// Learned keyword store: a bounded frequency map that boosts terms seen
// across many job descriptions.
//
// The store is consulted while scoring and updated after every fresh
// extraction. It lives behind a trait so callers can swap in a persistent
// or instrumented store; the in-memory implementation evicts the
// least-recently-seen entry once full. Persistence happens at the edges
// (`load` at startup, `snapshot` after a run) via the `db` module.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::Category;
use crate::text::normalize_term;

/// One learned term, the categories it was classified under, and how
/// often it has been seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnedKeyword {
    /// Normalized (lowercase) term
    pub term: String,
    /// Union of every category the term was classified under
    #[serde(default)]
    pub categories: BTreeSet<Category>,
    pub frequency: u32,
    pub last_seen: DateTime<Utc>,
}

/// Storage for learned keyword frequencies.
///
/// Implementations must be safe to share across threads: the same store
/// backs every tailoring request in a batch.
pub trait LearnedKeywordStore: Send + Sync {
    /// Current entry for a term, if any.
    fn get(&self, term: &str) -> Option<LearnedKeyword>;

    /// Insert or overwrite an entry.
    fn set(&self, entry: LearnedKeyword);

    /// Count one more sighting of `term` at `now`, merging `categories`
    /// into the ones already recorded.
    fn increment(&self, term: &str, categories: &BTreeSet<Category>, now: DateTime<Utc>);

    /// Every entry, most frequent first.
    fn snapshot(&self) -> Vec<LearnedKeyword>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hydrate from previously persisted entries.
    fn load(&self, entries: Vec<LearnedKeyword>) {
        for entry in entries {
            self.set(entry);
        }
    }

    /// Multiplicative score boost: 1 + 0.1 per sighting, capped at `cap`.
    fn boost(&self, term: &str, cap: f64) -> f64 {
        match self.get(term) {
            Some(entry) => (1.0 + 0.1 * entry.frequency as f64).min(cap),
            None => 1.0,
        }
    }
}

/// Bounded in-memory store.
pub struct InMemoryLearnedStore {
    capacity: usize,
    entries: Mutex<HashMap<String, LearnedKeyword>>,
}

impl InMemoryLearnedStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, LearnedKeyword>> {
        // A panic while holding the lock leaves the map itself intact
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Drop least-recently-seen entries until `entries` fits `capacity`.
fn evict_to(entries: &mut HashMap<String, LearnedKeyword>, capacity: usize) {
    while entries.len() > capacity {
        let oldest = entries
            .values()
            .min_by(|a, b| a.last_seen.cmp(&b.last_seen).then_with(|| a.term.cmp(&b.term)))
            .map(|e| e.term.clone());
        match oldest {
            Some(term) => {
                entries.remove(&term);
            }
            None => break,
        }
    }
}

impl LearnedKeywordStore for InMemoryLearnedStore {
    fn get(&self, term: &str) -> Option<LearnedKeyword> {
        self.lock().get(&normalize_term(term)).cloned()
    }

    fn set(&self, mut entry: LearnedKeyword) {
        entry.term = normalize_term(&entry.term);
        if entry.term.is_empty() {
            return;
        }
        let mut entries = self.lock();
        let key = entry.term.clone();
        entries.insert(key, entry);
        evict_to(&mut entries, self.capacity);
    }

    fn increment(&self, term: &str, categories: &BTreeSet<Category>, now: DateTime<Utc>) {
        let key = normalize_term(term);
        if key.is_empty() {
            return;
        }
        let mut entries = self.lock();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            evict_to(&mut entries, self.capacity - 1);
        }
        let entry = entries.entry(key.clone()).or_insert(LearnedKeyword {
            term: key,
            categories: BTreeSet::new(),
            frequency: 0,
            last_seen: now,
        });
        entry.categories.extend(categories.iter().copied());
        entry.frequency = entry.frequency.saturating_add(1);
        entry.last_seen = now;
    }

    fn snapshot(&self) -> Vec<LearnedKeyword> {
        let mut all: Vec<LearnedKeyword> = self.lock().values().cloned().collect();
        all.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.term.cmp(&b.term)));
        all
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
