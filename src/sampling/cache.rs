use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::sampling::request::SamplingResult;

/// Default number of retained sampling results.
pub const DEFAULT_CACHE_CAPACITY: usize = 40;

/// Cache handle shared by every sampler of one host.
///
/// The host runs single-threaded; interleaving only happens at suspension points, never during a
/// `lookup`/`insert` call.
pub type SharedSampleCache = Rc<RefCell<SampleCache>>;

/// Bounded memo of sampling results keyed by [`SamplingRequest::cache_key`].
///
/// Eviction follows insertion order: re-inserting a key moves it to the newest position, lookups
/// never reorder.
///
/// [`SamplingRequest::cache_key`]: crate::SamplingRequest::cache_key
#[derive(Debug)]
pub struct SampleCache {
    entries: HashMap<String, SamplingResult>,
    order: VecDeque<String>,
    capacity: usize,
}

impl Default for SampleCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SampleCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Create a default-capacity cache wrapped for sharing.
    pub fn shared() -> SharedSampleCache {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Fetch an entry without touching its position.
    pub fn lookup(&self, key: &str) -> Option<&SamplingResult> {
        self.entries.get(key)
    }

    /// Insert or replace `key` as the newest entry, evicting the oldest past capacity.
    pub fn insert(&mut self, key: String, value: SamplingResult) {
        if self.entries.remove(&key).is_some()
            && let Some(pos) = self.order.iter().position(|k| *k == key)
        {
            self.order.remove(pos);
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, value);

        while self.order.len() > self.capacity {
            if let Some(old) = self.order.pop_front() {
                tracing::debug!(key = %old, "evicting sampling result");
                self.entries.remove(&old);
            }
        }
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Maximum number of retained entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sampling/cache.rs"]
mod tests;
