use crate::error::CacheLoaderError;
use crate::listener::{
  CachedListener, ListenerId, MissListener, RemovalCause, RemovalListener,
};
use crate::metrics::MetricsSnapshot;
use crate::shared::{tombstone_all, CacheShared};

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use equivalent::Equivalent;

/// A thread-safe, read-through, N-way set-associative cache.
///
/// Keys hash to one of a fixed number of blocks; each block holds at most
/// `nway` live entries before the eviction policy tombstones victims.
/// Values are returned as `Arc<V>`, so `V` never needs to be `Clone`.
///
/// The handle is cheap to clone; all clones share one engine. Build
/// instances with [`CacheBuilder`](crate::builder::CacheBuilder).
///
/// ```
/// use nway_cache::CacheBuilder;
///
/// let cache = CacheBuilder::default()
///   .blocks(16)
///   .nway(4)
///   .max_entries_per_block(8)
///   .loader(|key: &u32| Ok::<_, std::io::Error>(key * 2))
///   .build()
///   .unwrap();
///
/// cache.put(1, 10);
/// assert_eq!(*cache.get(&1).unwrap(), 10); // hit
/// assert_eq!(*cache.get(&2).unwrap(), 4); // miss, loaded
/// ```
pub struct NWayCache<K, V, H = ahash::RandomState> {
  pub(crate) shared: Arc<CacheShared<K, V, H>>,
}

impl<K, V, H> Clone for NWayCache<K, V, H> {
  fn clone(&self) -> Self {
    Self {
      shared: self.shared.clone(),
    }
  }
}

impl<K, V, H> fmt::Debug for NWayCache<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NWayCache")
      .field("shared", &self.shared)
      .finish()
  }
}

impl<K, V, H> NWayCache<K, V, H>
where
  K: Eq + Hash + Clone,
  H: BuildHasher,
{
  /// Inserts `value` under `key`, displacing any live entry for the key.
  ///
  /// Displaced entries are tombstoned before the new entry is inserted
  /// and announced with cause [`RemovalCause::Replaced`] after it. A plain
  /// insert into a full block triggers the eviction policy first.
  pub fn put(&self, key: K, value: V) {
    let block = self.shared.store.block_for(&key);
    let matches = block.find_active(&key);

    if matches.is_empty() {
      self.shared.add_entry(block, key, value);
      return;
    }

    tombstone_all(&matches);
    self.shared.add_entry(block, key, value);
    self
      .shared
      .metrics
      .replacements
      .fetch_add(matches.len() as u64, Ordering::Relaxed);
    for old in &matches {
      self
        .shared
        .listeners
        .notify_removal(old, RemovalCause::Replaced);
    }
  }

  /// Returns the value for `key`, loading it on a miss.
  ///
  /// A hit stamps the entry's access time, notifies the cached listeners
  /// and returns the shared value. A miss notifies the miss listeners,
  /// invokes the loader outside any lock, inserts the loaded value and
  /// returns it; a loader failure is returned as [`CacheLoaderError`] and
  /// caches nothing.
  ///
  /// When a race has left several live entries for the key, they are all
  /// tombstoned and the key is reloaded as a miss, after which each
  /// displaced entry is announced with cause [`RemovalCause::Replaced`].
  pub fn get(&self, key: &K) -> Result<Arc<V>, CacheLoaderError> {
    let block = self.shared.store.block_for(key);
    let matches = block.find_active(key);

    match matches.len() {
      0 => {
        self.shared.metrics.misses.fetch_add(1, Ordering::Relaxed);
        self.shared.listeners.notify_miss(key);
        let value = self.load(key)?;
        Ok(self.shared.add_entry(block, key.clone(), value))
      }
      1 => {
        let entry = &matches[0];
        entry.touch();
        self.shared.metrics.hits.fetch_add(1, Ordering::Relaxed);
        self.shared.listeners.notify_cached(entry);
        Ok(entry.value())
      }
      _ => {
        // Loading outside the lock means two threads missing on the same
        // key can both insert it. Repair by dropping every duplicate and
        // reloading once.
        tombstone_all(&matches);
        self.shared.metrics.misses.fetch_add(1, Ordering::Relaxed);
        self.shared.listeners.notify_miss(key);
        let value = self.load(key)?;
        let fresh = self.shared.add_entry(block, key.clone(), value);
        self
          .shared
          .metrics
          .replacements
          .fetch_add(matches.len() as u64, Ordering::Relaxed);
        for old in &matches {
          self
            .shared
            .listeners
            .notify_removal(old, RemovalCause::Replaced);
        }
        Ok(fresh)
      }
    }
  }

  /// Discards the live entry for `key`, if any.
  ///
  /// The entry is tombstoned and announced with cause
  /// [`RemovalCause::User`]; physical removal happens on a later insert
  /// into the same block. Removing an absent key does nothing.
  pub fn remove<Q>(&self, key: &Q)
  where
    Q: Hash + Equivalent<K> + ?Sized,
  {
    let block = self.shared.store.block_for(key);
    let matches = block.find_active(key);
    if matches.is_empty() {
      return;
    }

    tombstone_all(&matches);
    self
      .shared
      .metrics
      .removals
      .fetch_add(matches.len() as u64, Ordering::Relaxed);
    for entry in &matches {
      self
        .shared
        .listeners
        .notify_removal(entry, RemovalCause::User);
    }
  }

  /// True if a live entry for `key` is present. Never loads, never
  /// touches the entry's access time.
  pub fn contains<Q>(&self, key: &Q) -> bool
  where
    Q: Hash + Equivalent<K> + ?Sized,
  {
    let block = self.shared.store.block_for(key);
    let entries = block.entries.read();
    entries
      .iter()
      .any(|entry| entry.is_active() && key.equivalent(entry.key()))
  }

  /// Returns the value for `key` if a live entry is present, without
  /// loading on a miss. Unlike [`get`](NWayCache::get), it leaves the
  /// access time and the listeners untouched.
  pub fn peek<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    Q: Hash + Equivalent<K> + ?Sized,
  {
    let block = self.shared.store.block_for(key);
    let entries = block.entries.read();
    entries
      .iter()
      .find(|entry| entry.is_active() && key.equivalent(entry.key()))
      .map(|entry| entry.value())
  }

  /// Invokes the loader for `key`, counting the outcome.
  fn load(&self, key: &K) -> Result<V, CacheLoaderError> {
    self.shared.metrics.loads.fetch_add(1, Ordering::Relaxed);
    match self.shared.loader.load(key) {
      Ok(value) => Ok(value),
      Err(source) => {
        self
          .shared
          .metrics
          .load_failures
          .fetch_add(1, Ordering::Relaxed);
        Err(CacheLoaderError::new(source))
      }
    }
  }
}

impl<K, V, H> NWayCache<K, V, H> {
  /// Registers a listener for entries leaving the cache.
  pub fn add_removal_listener(
    &self,
    listener: impl RemovalListener<K, V> + 'static,
  ) -> ListenerId {
    self.shared.listeners.add_removal(Arc::new(listener))
  }

  /// Deregisters a removal listener. Unknown ids are ignored.
  pub fn remove_removal_listener(&self, id: ListenerId) {
    self.shared.listeners.remove_removal(id);
  }

  /// Registers a listener for lookups that go to the loader.
  pub fn add_miss_listener(&self, listener: impl MissListener<K> + 'static) -> ListenerId {
    self.shared.listeners.add_miss(Arc::new(listener))
  }

  /// Deregisters a miss listener. Unknown ids are ignored.
  pub fn remove_miss_listener(&self, id: ListenerId) {
    self.shared.listeners.remove_miss(id);
  }

  /// Registers a listener for lookups served from the cache.
  pub fn add_cached_listener(
    &self,
    listener: impl CachedListener<K, V> + 'static,
  ) -> ListenerId {
    self.shared.listeners.add_cached(Arc::new(listener))
  }

  /// Deregisters a cached listener. Unknown ids are ignored.
  pub fn remove_cached_listener(&self, id: ListenerId) {
    self.shared.listeners.remove_cached(id);
  }

  /// Returns a snapshot of the cache's counters.
  pub fn metrics(&self) -> MetricsSnapshot {
    self.shared.metrics.snapshot()
  }

  /// The number of blocks the key space shards into.
  pub fn num_blocks(&self) -> usize {
    self.shared.store.num_blocks()
  }

  /// The number of live entries a block holds before eviction runs.
  pub fn nway(&self) -> usize {
    self.shared.nway
  }
}
