//! De-duplication Cache
//!
//! Keeps a fixed-size set of recently processed document ids so the worker
//! can drop repeats inside the dedupe window. Eviction runs along two axes:
//! total capacity and per-entry time-to-live.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};


struct Entry {
    key: String,
    ts: Instant,
}

struct Inner {
    items: HashMap<String, Instant>,
    order: VecDeque<Entry>,
}

/// Bounded, time-bounded set of recently observed keys.
///
/// The map answers `is_seen` in O(1); the append-ordered history drives
/// compaction. Both live behind one mutex so they never drift apart.
pub struct Cache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Duration,
}

impl Cache {
    /// Creates a cache with the provided capacity and ttl.
    /// A capacity below 1 becomes 1; a zero ttl becomes one hour.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        let ttl = if ttl.is_zero() {
            Duration::from_secs(3600)
        } else {
            ttl
        };

        Self {
            inner: Mutex::new(Inner {
                items: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            }),
            capacity,
            ttl,
        }
    }

    /// Reports whether the key was observed inside the ttl window.
    /// Does not mark the key; use [`Cache::mark_seen`] to record one.
    pub fn is_seen(&self, key: &str) -> bool {
        let now = Instant::now();
        let inner = self.lock();

        match inner.items.get(key) {
            Some(ts) => now.duration_since(*ts) <= self.ttl,
            None => false,
        }
    }

    /// Records that a key has been processed, then compacts.
    pub fn mark_seen(&self, key: &str) {
        let now = Instant::now();
        let mut inner = self.lock();

        inner.items.insert(key.to_string(), now);
        inner.order.push_back(Entry {
            key: key.to_string(),
            ts: now,
        });
        self.compact(&mut inner, now);
    }

    /// Pops history entries while the map is over capacity or the oldest
    /// entry has aged out. A history entry whose timestamp no longer matches
    /// the map (the key was re-marked later) is skipped without touching the
    /// map.
    fn compact(&self, inner: &mut Inner, now: Instant) {
        while inner.order.front().is_some_and(|oldest| {
            inner.items.len() > self.capacity || now.duration_since(oldest.ts) > self.ttl
        }) {
            if let Some(oldest) = inner.order.pop_front() {
                if inner.items.get(&oldest.key) == Some(&oldest.ts) {
                    inner.items.remove(&oldest.key);
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("dedupe cache mutex poisoned")
    }
}
