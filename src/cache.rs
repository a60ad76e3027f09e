//! # Result Cache
//!
//! Memoizes the processing pipeline (validate, parse, extract, detect) by a
//! SHA-256 hash of the exact raw content.
//!
//! ## Policy
//! - Key: content hash. Identical text from different songs shares a slot.
//! - Hits return copies and never re-run the pipeline. Reads do not refresh
//!   an entry's position: eviction is by insertion order, not use.
//! - Cleanup runs when an insert pushes the size past `max_entries`, or when
//!   a lookup finds an entry older than `max_age`. It drops expired entries,
//!   then keeps only the most recently inserted
//!   [`retain_count`](crate::config::CacheConfig::retain_count) entries.
//! - Parse errors are not cached.
//!
//! ## Lifecycle
//! Create one cache at application start and hand a reference to whatever
//! needs it. There is no global instance. All state sits behind one mutex;
//! the pipeline itself runs outside the lock, so misses on different
//! content proceed in parallel. Concurrent misses on the same content run
//! the pipeline once: later callers wait for it and count as hits.

use crate::api::{process, ChordSheet};
use crate::ast::ParsedSong;
use crate::config::{CacheConfig, EngineConfig};
use crate::error::ParseError;
use crate::metadata::ChordSheetMetadata;
use crate::vocabulary::Spelling;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Hex SHA-256 of the raw content bytes
pub fn content_hash(raw: &str) -> String {
    format!("{:x}", Sha256::digest(raw.as_bytes()))
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub sheet: ChordSheet,
    pub inserted_at: Instant,
    /// Insertion order; higher is newer
    seq: u64,
}

/// Counters since construction (or the last [`ResultCache::clear`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    /// Calls that ran the pipeline themselves
    pub misses: u64,
    /// Pipeline runs, successful or not
    pub parses: u64,
    pub evictions: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    /// Hashes currently being processed by some caller
    in_flight: HashSet<String>,
    next_seq: u64,
}

/// Claim on one content hash; releases waiting callers when dropped,
/// including when the pipeline panics.
struct InFlight<'a> {
    cache: &'a ResultCache,
    key: &'a str,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.cache.state().in_flight.remove(self.key);
        self.cache.ready.notify_all();
    }
}

#[derive(Debug)]
pub struct ResultCache {
    engine: EngineConfig,
    state: Mutex<CacheState>,
    ready: Condvar,
    hits: AtomicU64,
    misses: AtomicU64,
    parses: AtomicU64,
    evictions: AtomicU64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl ResultCache {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            engine: config.clone(),
            state: Mutex::new(CacheState::default()),
            ready: Condvar::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            parses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.engine.cache
    }

    /// Spelling configured for sessions opened through this cache
    pub fn spelling(&self) -> Spelling {
        self.engine.spelling
    }

    /// Parsed song and metadata for `raw`, from cache when possible
    pub fn get_or_parse(&self, raw: &str) -> Result<(ParsedSong, ChordSheetMetadata), ParseError> {
        self.get_or_process(raw)
            .map(|sheet| (sheet.song, sheet.metadata))
    }

    /// Full pipeline result for `raw`, from cache when possible
    pub fn get_or_process(&self, raw: &str) -> Result<ChordSheet, ParseError> {
        self.get_or_process_at(raw, Instant::now())
    }

    pub(crate) fn get_or_process_at(&self, raw: &str, now: Instant) -> Result<ChordSheet, ParseError> {
        let key = content_hash(raw);

        let mut state = self.state();
        loop {
            if let Some(sheet) = self.lookup(&mut state, &key, now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(hash = %key, "Chord sheet cache hit");
                return Ok(sheet);
            }
            if !state.in_flight.contains(&key) {
                break;
            }
            tracing::debug!(hash = %key, "Waiting for in-flight chord sheet");
            state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.in_flight.insert(key.clone());
        drop(state);

        let claim = InFlight { cache: self, key: &key };
        self.misses.fetch_add(1, Ordering::Relaxed);

        if self.engine.is_large(raw) {
            tracing::warn!(
                bytes = raw.len(),
                threshold = self.engine.large_content_bytes,
                "Processing large chord sheet; consider running off the UI thread"
            );
        }

        self.parses.fetch_add(1, Ordering::Relaxed);
        let result = process(raw);
        if let Ok(sheet) = &result {
            self.insert(key.clone(), sheet.clone(), now);
        }
        drop(claim);
        result
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.state().entries.contains_key(&content_hash(raw))
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and zero the counters
    pub fn clear(&self) {
        let mut state = self.state();
        state.entries.clear();
        state.next_seq = 0;
        for counter in [&self.hits, &self.misses, &self.parses, &self.evictions] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            parses: self.parses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Every statement leaves the state consistent, so a poisoned lock is safe to reuse.
    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, state: &mut CacheState, key: &str, now: Instant) -> Option<ChordSheet> {
        let expired = match state.entries.get(key) {
            None => return None,
            Some(entry) => self.is_expired(entry, now),
        };
        if expired {
            self.cleanup(state, now);
            return None;
        }
        state.entries.get(key).map(|entry| entry.sheet.clone())
    }

    fn insert(&self, key: String, sheet: ChordSheet, now: Instant) {
        let mut state = self.state();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CacheEntry {
                sheet,
                inserted_at: now,
                seq,
            },
        );
        tracing::debug!(entries = state.entries.len(), "Chord sheet cached");

        if state.entries.len() > self.engine.cache.max_entries {
            self.cleanup(&mut state, now);
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) > self.engine.cache.max_age
    }

    fn cleanup(&self, state: &mut CacheState, now: Instant) {
        let before = state.entries.len();
        state.entries.retain(|_, entry| !self.is_expired(entry, now));

        let keep = self.engine.cache.retain_count();
        if state.entries.len() > keep {
            let mut seqs: Vec<u64> = state.entries.values().map(|e| e.seq).collect();
            seqs.sort_unstable_by(|a, b| b.cmp(a));
            let oldest_kept = seqs[keep - 1];
            state.entries.retain(|_, entry| entry.seq >= oldest_kept);
        }

        let evicted = before - state.entries.len();
        self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        tracing::debug!(evicted, remaining = state.entries.len(), "Chord sheet cache cleanup");
    }
}
