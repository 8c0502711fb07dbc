use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::normalizer::CanonicalKey;
use crate::species::{LookupError, SpeciesSource};
use crate::types::SpeciesRecord;

#[derive(Debug, Clone)]
struct CacheEntry {
    record: SpeciesRecord,
    inserted_at: Instant,
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CanonicalKey, CacheEntry>,
    tick: u64,
}

/// TTL cache in front of a [`SpeciesSource`].
///
/// Entries are fresh for `ttl` after insertion. A stale entry is replaced
/// wholesale by the next successful fetch. Failed lookups are never stored.
///
/// The map sits behind a mutex that is never held across an `.await`, so
/// the cache can be shared between tasks. Two concurrent misses for the
/// same key may both reach the source; the later insert wins.
///
/// With a capacity set, inserting a new key into a full cache first drops
/// stale entries and then the least recently used one.
pub struct SpeciesCache<S> {
    source: S,
    ttl: Duration,
    capacity: Option<usize>,
    state: Mutex<CacheState>,
}

impl<S> std::fmt::Debug for SpeciesCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeciesCache")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl<S: SpeciesSource> SpeciesCache<S> {
    pub fn new(source: S, config: &CacheConfig) -> Self {
        Self {
            source,
            ttl: config.ttl,
            capacity: config.capacity.filter(|c| *c > 0),
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Return the cached record for `key` if still fresh, otherwise fetch it
    /// from the source, store it, and return it.
    pub async fn get_or_fetch(&self, key: &CanonicalKey) -> Result<SpeciesRecord, LookupError> {
        if let Some(record) = self.get_fresh(key) {
            tracing::debug!(%key, "species cache hit");
            return Ok(record);
        }

        tracing::debug!(%key, "species cache miss");
        let record = self.source.fetch(key).await?;
        self.insert(key.clone(), record.clone());
        Ok(record)
    }
}

impl<S> SpeciesCache<S> {
    /// Fresh cached record for `key`, without touching the source.
    pub fn get_fresh(&self, key: &CanonicalKey) -> Option<SpeciesRecord> {
        let mut state = self.lock();
        state.tick += 1;
        let tick = state.tick;
        let ttl = self.ttl;

        let entry = state.entries.get_mut(key)?;
        if entry.inserted_at.elapsed() >= ttl {
            return None;
        }
        entry.last_used = tick;
        Some(entry.record.clone())
    }

    fn insert(&self, key: CanonicalKey, record: SpeciesRecord) {
        let mut state = self.lock();
        state.tick += 1;
        let now = Instant::now();

        if let Some(capacity) = self.capacity {
            if !state.entries.contains_key(&key) && state.entries.len() >= capacity {
                let ttl = self.ttl;
                state
                    .entries
                    .retain(|_, e| now.duration_since(e.inserted_at) < ttl);

                if state.entries.len() >= capacity {
                    let oldest = state
                        .entries
                        .iter()
                        .min_by_key(|(_, e)| e.last_used)
                        .map(|(k, _)| k.clone());
                    if let Some(oldest) = oldest {
                        tracing::debug!(key = %oldest, "evicting least recently used species");
                        state.entries.remove(&oldest);
                    }
                }
            }
        }

        let entry = CacheEntry {
            record,
            inserted_at: now,
            last_used: state.tick,
        };
        state.entries.insert(key, entry);
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// The wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    // Every mutation is a single HashMap call; a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SpeciesSource for CountingSource {
        async fn fetch(&self, key: &CanonicalKey) -> Result<SpeciesRecord, LookupError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::task::yield_now().await;
            if key.as_str() == "missingno" {
                return Err(LookupError::NotFound(key.to_string()));
            }
            Ok(SpeciesRecord {
                name: key.to_string(),
                types: vec![],
                abilities: vec![],
                height: 1,
                weight: n as u32,
                sprite: None,
                stats: vec![],
            })
        }
    }

    fn key(s: &str) -> CanonicalKey {
        CanonicalKey::parse(s).unwrap()
    }

    fn cache(ttl_secs: u64, capacity: Option<usize>) -> SpeciesCache<CountingSource> {
        let config = CacheConfig {
            ttl: Duration::from_secs(ttl_secs),
            capacity,
        };
        SpeciesCache::new(CountingSource::default(), &config)
    }

    #[tokio::test(start_paused = true)]
    async fn miss_fetches_once_and_stores() {
        let cache = cache(3600, None);
        let record = cache.get_or_fetch(&key("pikachu")).await.unwrap();

        assert_eq!(record.name, "pikachu");
        assert_eq!(cache.source().calls(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_fresh(&key("pikachu")), Some(record));
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_hit_skips_source() {
        let cache = cache(3600, None);
        let first = cache.get_or_fetch(&key("pikachu")).await.unwrap();
        tokio::time::advance(Duration::from_secs(3599)).await;
        let second = cache.get_or_fetch(&key("pikachu")).await.unwrap();

        assert_eq!(cache.source().calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entry_is_refetched_and_replaced() {
        let cache = cache(3600, None);
        let first = cache.get_or_fetch(&key("pikachu")).await.unwrap();
        tokio::time::advance(Duration::from_secs(3601)).await;
        let second = cache.get_or_fetch(&key("pikachu")).await.unwrap();

        assert_eq!(cache.source().calls(), 2);
        assert_eq!(cache.len(), 1);
        // The source stamps weight with its call count.
        assert_eq!(first.weight, 1);
        assert_eq!(second.weight, 2);
        assert_eq!(cache.get_fresh(&key("pikachu")).unwrap().weight, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_exactly_at_ttl() {
        let cache = cache(10, None);
        cache.get_or_fetch(&key("eevee")).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(cache.get_fresh(&key("eevee")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_not_cached() {
        let cache = cache(3600, None);
        assert!(cache.get_or_fetch(&key("missingno")).await.is_err());
        assert!(cache.get_or_fetch(&key("missingno")).await.is_err());

        assert_eq!(cache.source().calls(), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_evicts_least_recently_used() {
        let cache = cache(3600, Some(2));
        cache.get_or_fetch(&key("bulbasaur")).await.unwrap();
        cache.get_or_fetch(&key("charmander")).await.unwrap();
        // Touch bulbasaur so charmander becomes the LRU entry.
        cache.get_or_fetch(&key("bulbasaur")).await.unwrap();
        cache.get_or_fetch(&key("squirtle")).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get_fresh(&key("bulbasaur")).is_some());
        assert!(cache.get_fresh(&key("squirtle")).is_some());
        assert!(cache.get_fresh(&key("charmander")).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_prefers_dropping_stale_entries() {
        let cache = cache(60, Some(2));
        cache.get_or_fetch(&key("bulbasaur")).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.get_or_fetch(&key("charmander")).await.unwrap();
        cache.get_or_fetch(&key("charmander")).await.unwrap();
        cache.get_or_fetch(&key("squirtle")).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get_fresh(&key("charmander")).is_some());
        assert!(cache.get_fresh(&key("squirtle")).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_of_existing_key_does_not_evict() {
        let cache = cache(60, Some(2));
        cache.get_or_fetch(&key("bulbasaur")).await.unwrap();
        cache.get_or_fetch(&key("charmander")).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.get_or_fetch(&key("bulbasaur")).await.unwrap();

        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_cache_keeps_everything() {
        let cache = cache(3600, None);
        for name in ["a", "b", "c", "d", "e"] {
            cache.get_or_fetch(&key(name)).await.unwrap();
        }
        assert_eq!(cache.len(), 5);
        assert_eq!(cache.capacity(), None);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_share_one_entry() {
        const TASKS: usize = 8;
        let cache = Arc::new(cache(3600, None));

        let handles: Vec<_> = (0..TASKS)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.get_or_fetch(&key("pikachu")).await })
            })
            .collect();

        for handle in handles {
            let record = handle.await.unwrap().unwrap();
            assert_eq!(record.name, "pikachu");
        }

        assert_eq!(cache.len(), 1);
        let calls = cache.source().calls();
        assert!((1..=TASKS).contains(&calls), "unexpected fetch count {calls}");

        // Whichever insert landed last is what later readers see.
        let stored = cache.get_fresh(&key("pikachu")).unwrap();
        assert!((1..=TASKS as u32).contains(&stored.weight));
        assert_eq!(cache.source().calls(), calls);
    }
}
