//! Bounded page cache with request coalescing.
//!
//! ```text
//! get_or_fetch(url) ─┬─ hit ──────────────► Arc<T>
//!                    ├─ in flight ────────► await the same Shared future
//!                    └─ miss ─► fetch() ──► store on success, fan out result
//! ```

mod library;

pub use library::Library;

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app::ScrapeResult;
use crate::domain::CanonicalUrl;

pub const DEFAULT_CHAPTER_CAPACITY: usize = 20;
pub const DEFAULT_NOVEL_CAPACITY: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Parsed chapters kept in memory (default: 20)
    pub chapter_capacity: usize,
    /// Novel pages (chapter lists) kept in memory (default: 8)
    pub novel_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            chapter_capacity: DEFAULT_CHAPTER_CAPACITY,
            novel_capacity: DEFAULT_NOVEL_CAPACITY,
        }
    }
}

type SharedFetch<T> = Shared<BoxFuture<'static, ScrapeResult<Arc<T>>>>;

struct Entry<T> {
    value: Arc<T>,
    last_used: u64,
}

struct Inner<T> {
    entries: HashMap<CanonicalUrl, Entry<T>>,
    in_flight: HashMap<CanonicalUrl, SharedFetch<T>>,
    clock: u64,
}

impl<T> Inner<T> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn touch(&mut self, key: &CanonicalUrl) -> Option<Arc<T>> {
        let now = self.tick();
        self.entries.get_mut(key).map(|entry| {
            entry.last_used = now;
            entry.value.clone()
        })
    }
}

/// LRU cache of parsed pages keyed by canonical URL.
///
/// The lock is only held for bookkeeping, never across an await.
pub struct PageCache<T> {
    name: &'static str,
    capacity: usize,
    inner: Mutex<Inner<T>>,
}

impl<T: Send + Sync + 'static> PageCache<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                in_flight: HashMap::new(),
                clock: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // Bookkeeping cannot be left half-done by a panic, so poisoning is ignored.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &CanonicalUrl) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Look up an entry, marking it most recently used.
    pub fn get(&self, key: &CanonicalUrl) -> Option<Arc<T>> {
        self.lock().touch(key)
    }

    pub fn put(&self, key: CanonicalUrl, value: Arc<T>) {
        let mut inner = self.lock();
        self.insert(&mut inner, key, value);
    }

    fn insert(&self, inner: &mut Inner<T>, key: CanonicalUrl, value: Arc<T>) {
        let now = inner.tick();
        inner.entries.insert(
            key,
            Entry {
                value,
                last_used: now,
            },
        );

        while inner.entries.len() > self.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    inner.entries.remove(&key);
                    debug!("{} cache evicted {}", self.name, key);
                }
                None => break,
            }
        }
    }

    /// Return the cached value or run `fetch`, sharing one in-flight fetch
    /// among all concurrent callers for the same key.
    ///
    /// Every waiter receives the same result. Failures are not cached.
    /// `fetch` is only invoked to build the future; it must not block.
    pub async fn get_or_fetch<F, Fut>(&self, key: &CanonicalUrl, fetch: F) -> ScrapeResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ScrapeResult<T>> + Send + 'static,
    {
        let pending = {
            let mut inner = self.lock();
            if let Some(hit) = inner.touch(key) {
                debug!("{} cache hit {}", self.name, key);
                return Ok(hit);
            }
            match inner.in_flight.get(key) {
                Some(pending) => {
                    debug!("{} cache joining in-flight fetch {}", self.name, key);
                    pending.clone()
                }
                None => {
                    let pending: SharedFetch<T> = fetch().map(|r| r.map(Arc::new)).boxed().shared();
                    inner.in_flight.insert(key.clone(), pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut inner = self.lock();
        let owns_slot = inner
            .in_flight
            .get(key)
            .is_some_and(|current| current.ptr_eq(&pending));
        if owns_slot {
            inner.in_flight.remove(key);
            if let Ok(value) = &result {
                self.insert(&mut inner, key.clone(), value.clone());
            }
        }

        result
    }
}
