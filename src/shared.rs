use crate::entry::CacheEntry;
use crate::listener::{ListenerRegistry, RemovalCause};
use crate::loader::CacheLoader;
use crate::metrics::Metrics;
use crate::policy::EvictionPolicy;
use crate::store::{Block, BlockStore};

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Tombstones every entry in `entries`.
///
/// No lock is needed: status is an atomic flag and physical removal is
/// deferred to the next compaction on the owning block.
pub(crate) fn tombstone_all<K, V>(entries: &[Arc<CacheEntry<K, V>>]) {
  for entry in entries {
    entry.mark_deleted();
  }
}

/// The shared core of a cache: the block array plus everything the
/// operations need around it. Public handles are an `Arc` of this.
pub(crate) struct CacheShared<K, V, H> {
  pub(crate) store: BlockStore<K, V, H>,
  pub(crate) nway: usize,
  pub(crate) max_entries_per_block: usize,
  pub(crate) eviction: Arc<dyn EvictionPolicy<K, V>>,
  pub(crate) loader: Arc<dyn CacheLoader<K, V>>,
  pub(crate) listeners: ListenerRegistry<K, V>,
  pub(crate) metrics: Metrics,
}

impl<K, V, H> fmt::Debug for CacheShared<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheShared")
      .field("num_blocks", &self.store.num_blocks())
      .field("nway", &self.nway)
      .field("max_entries_per_block", &self.max_entries_per_block)
      .finish_non_exhaustive()
  }
}

impl<K, V, H> CacheShared<K, V, H>
where
  K: Eq + Clone,
{
  /// Inserts a fresh live entry for `key` into `block` and returns its
  /// value, driving the eviction and compaction protocol:
  ///
  /// 1. If the block already holds `nway` or more entries, the eviction
  ///    policy runs against a read-locked snapshot, outside any lock.
  /// 2. Under the write lock, one compaction pass drops every tombstoned
  ///    entry and every entry sharing the new key, firing an `Evicted`
  ///    removal notification for each, then appends the new entry at the
  ///    tail.
  /// 3. A block that still reaches `max_entries_per_block` after that is
  ///    a fatal misconfiguration. The eviction policy is not reclaiming
  ///    capacity, and the process panics rather than grow without bound.
  pub(crate) fn add_entry(&self, block: &Block<K, V>, key: K, value: V) -> Arc<V> {
    let entry = Arc::new(CacheEntry::new(key, value));
    let value = entry.value();

    if block.len() >= self.nway {
      let snapshot = block.snapshot();
      self.eviction.evict(&snapshot);
    }

    let block_len = {
      let mut entries = block.entries.write();
      entries.retain(|existing| {
        let keep = existing.is_active() && existing.key() != entry.key();
        if !keep {
          self.metrics.evictions.fetch_add(1, Ordering::Relaxed);
          self.metrics.current_entries.fetch_sub(1, Ordering::Relaxed);
          self.listeners.notify_removal(existing, RemovalCause::Evicted);
        }
        keep
      });
      entries.push(entry);
      self.metrics.inserts.fetch_add(1, Ordering::Relaxed);
      self.metrics.current_entries.fetch_add(1, Ordering::Relaxed);
      entries.len()
    };

    if block_len >= self.max_entries_per_block {
      panic!(
        "cache block exhausted: {} entries reached the max_entries_per_block ceiling of {} \
         (nway {}); the eviction policy is not reclaiming capacity",
        block_len, self.max_entries_per_block, self.nway
      );
    }

    value
  }
}
