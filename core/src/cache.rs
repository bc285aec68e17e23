//! Response cache collaborators.
//!
//! # Design
//! `ResourceService` only needs four capabilities from a cache, captured by
//! the `Cache` trait. `NullCache` is the default collaborator: it always
//! misses, so a service built with it behaves exactly as an uncached one.
//! `MemoryCache` is a small in-process store honoring per-entry lifetimes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Minimal cache capability set. Values are opaque strings.
///
/// `ttl_seconds == 0` stores an entry without expiry.
pub trait Cache: Send + Sync {
    fn fetch(&self, id: &str) -> Option<String>;
    fn contains(&self, id: &str) -> bool;
    fn save(&self, id: &str, data: String, ttl_seconds: u64) -> bool;
    fn delete(&self, id: &str) -> bool;
}

/// A cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn fetch(&self, _id: &str) -> Option<String> {
        None
    }

    fn contains(&self, _id: &str) -> bool {
        false
    }

    fn save(&self, _id: &str, _data: String, _ttl_seconds: u64) -> bool {
        true
    }

    fn delete(&self, _id: &str) -> bool {
        true
    }
}

#[derive(Debug)]
struct Entry {
    data: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-process cache with per-entry time-to-live.
///
/// An expired entry is evicted when it is looked up, and every `save`
/// sweeps all expired entries.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A poisoned map is still structurally valid; keep serving it.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live(&self, id: &str) -> Option<String> {
        let mut entries = self.lock();
        match entries.get(id) {
            Some(entry) if entry.is_live(Instant::now()) => Some(entry.data.clone()),
            Some(_) => {
                entries.remove(id);
                None
            }
            None => None,
        }
    }
}

impl Cache for MemoryCache {
    fn fetch(&self, id: &str) -> Option<String> {
        self.live(id)
    }

    fn contains(&self, id: &str) -> bool {
        self.live(id).is_some()
    }

    fn save(&self, id: &str, data: String, ttl_seconds: u64) -> bool {
        let now = Instant::now();
        let expires_at = match ttl_seconds {
            0 => None,
            secs => now.checked_add(Duration::from_secs(secs)),
        };
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(id.to_string(), Entry { data, expires_at });
        true
    }

    fn delete(&self, id: &str) -> bool {
        self.lock().remove(id);
        true
    }
}
