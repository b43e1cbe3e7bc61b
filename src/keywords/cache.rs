// Keyword cache: a TTL-bounded memo of extraction results.
//
// Keys are the JD's source URL when it has one, otherwise a SHA-256
// fingerprint of a text sample plus the text length. Entries expire after
// the TTL and the oldest entry is evicted once capacity is exceeded.
//
// Concurrent requests for the same key are resolved last-writer-wins: each
// extraction takes a ticket with `begin` before it starts, and `complete`
// only stores the result if no newer ticket was issued for that key in the
// meantime. A superseded result is discarded without touching the cache.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::models::Keyword;
use crate::jd::models::{JobDescription, StructureKind};
use crate::text::floor_char_boundary;

/// Bytes of clean text hashed into a content fingerprint.
const FINGERPRINT_SAMPLE: usize = 2_000;

/// Cache key for a job description.
pub fn cache_key(jd: &JobDescription) -> String {
    match jd.source_url() {
        Some(url) => format!("url:{url}"),
        None => content_fingerprint(jd.clean_text()),
    }
}

/// `sha256:<hex of the first 2000 bytes>:<total length>`.
pub fn content_fingerprint(text: &str) -> String {
    let sample = &text[..floor_char_boundary(text, FINGERPRINT_SAMPLE)];
    let digest = Sha256::digest(sample.as_bytes());
    format!("sha256:{}:{}", hex::encode(digest), text.len())
}

/// A cached extraction.
#[derive(Debug, Clone)]
pub struct CachedKeywords {
    pub keywords: Vec<Keyword>,
    pub structure: StructureKind,
    pub stored_at: DateTime<Utc>,
}

/// Proof of an in-flight extraction for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTicket {
    key: String,
    generation: u64,
}

impl CacheTicket {
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CachedKeywords>,
    /// Latest ticket generation issued per key still in flight
    in_flight: HashMap<String, u64>,
    next_generation: u64,
}

/// TTL + capacity bounded extraction cache.
pub struct KeywordCache {
    ttl: Duration,
    capacity: usize,
    state: Mutex<CacheState>,
}

impl KeywordCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<CachedKeywords> {
        self.get_at(key, Utc::now())
    }

    /// Look up `key` as of `now`. Expired entries are evicted and reported
    /// as a miss.
    pub fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<CachedKeywords> {
        let mut state = self.lock();
        let fresh = state.entries.get(key).map(|e| now - e.stored_at < self.ttl)?;
        if fresh {
            state.entries.get(key).cloned()
        } else {
            debug!(key, "Keyword cache entry expired");
            state.entries.remove(key);
            None
        }
    }

    /// Register a new extraction for `key`, superseding any in flight.
    pub fn begin(&self, key: &str) -> CacheTicket {
        let mut state = self.lock();
        state.next_generation += 1;
        let generation = state.next_generation;
        state.in_flight.insert(key.to_string(), generation);
        CacheTicket {
            key: key.to_string(),
            generation,
        }
    }

    pub fn complete(&self, ticket: CacheTicket, keywords: Vec<Keyword>, structure: StructureKind) -> bool {
        self.complete_at(ticket, keywords, structure, Utc::now())
    }

    /// Store the result for `ticket` unless a newer ticket superseded it.
    /// Returns whether the result was stored.
    pub fn complete_at(
        &self,
        ticket: CacheTicket,
        keywords: Vec<Keyword>,
        structure: StructureKind,
        now: DateTime<Utc>,
    ) -> bool {
        let mut state = self.lock();
        if state.in_flight.get(&ticket.key) != Some(&ticket.generation) {
            debug!(key = %ticket.key, "Discarding superseded extraction");
            return false;
        }
        state.in_flight.remove(&ticket.key);
        insert_entry(&mut state, self.capacity, ticket.key, keywords, structure, now);
        true
    }

    /// Insert or overwrite directly, outside the ticket protocol.
    pub fn set_at(&self, key: &str, keywords: Vec<Keyword>, structure: StructureKind, now: DateTime<Utc>) {
        let mut state = self.lock();
        insert_entry(&mut state, self.capacity, key.to_string(), keywords, structure, now);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.in_flight.clear();
    }
}

fn insert_entry(
    state: &mut CacheState,
    capacity: usize,
    key: String,
    keywords: Vec<Keyword>,
    structure: StructureKind,
    now: DateTime<Utc>,
) {
    state.entries.insert(
        key,
        CachedKeywords {
            keywords,
            structure,
            stored_at: now,
        },
    );
    while state.entries.len() > capacity {
        let oldest = state
            .entries
            .iter()
            .min_by(|a, b| a.1.stored_at.cmp(&b.1.stored_at).then_with(|| a.0.cmp(b.0)))
            .map(|(k, _)| k.clone());
        match oldest {
            Some(k) => {
                state.entries.remove(&k);
            }
            None => break,
        }
    }
}
