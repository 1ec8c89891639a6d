use crate::time;

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle state of a [`CacheEntry`].
///
/// The only transition is `Active` to `Deleted`. A tombstoned entry never
/// comes back; it lingers in its block until a later insert on the same
/// block compacts it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryStatus {
  /// The entry is live and visible to lookups.
  Active = 0,
  /// The entry is tombstoned and waiting for compaction.
  Deleted = 1,
}

/// A single cached key/value pair together with its lifecycle metadata.
///
/// Entries are shared via `Arc` between the owning block, in-flight
/// operations and eviction snapshots. The mutable parts, `access_time` and
/// `status`, are independent atomic scalars so readers and eviction
/// policies can update them without holding the block lock.
#[derive(Debug)]
pub struct CacheEntry<K, V> {
  key: K,
  /// The user's value, wrapped in an `Arc` for shared ownership.
  value: Arc<V>,
  /// Creation timestamp in nanoseconds since the cache epoch. Immutable.
  creation_time: u64,
  /// Last-hit timestamp in nanoseconds since the cache epoch.
  pub(crate) access_time: AtomicU64,
  /// Current [`EntryStatus`], stored as its `u8` discriminant.
  status: AtomicU8,
}

impl<K, V> CacheEntry<K, V> {
  /// Creates a live entry with both timestamps set to now.
  pub(crate) fn new(key: K, value: V) -> Self {
    let now = time::now_nanos();
    Self {
      key,
      value: Arc::new(value),
      creation_time: now,
      access_time: AtomicU64::new(now),
      status: AtomicU8::new(EntryStatus::Active as u8),
    }
  }

  /// The entry's key.
  #[inline]
  pub fn key(&self) -> &K {
    &self.key
  }

  /// Returns a clone of the `Arc` holding the value.
  #[inline]
  pub fn value(&self) -> Arc<V> {
    self.value.clone()
  }

  /// The instant this entry was created.
  #[inline]
  pub fn creation_time(&self) -> Instant {
    time::nanos_to_instant(self.creation_time)
  }

  /// The instant this entry was last returned by a cache hit.
  #[inline]
  pub fn access_time(&self) -> Instant {
    time::nanos_to_instant(self.access_time.load(Ordering::Relaxed))
  }

  /// The entry's current lifecycle status.
  #[inline]
  pub fn status(&self) -> EntryStatus {
    if self.status.load(Ordering::Relaxed) == EntryStatus::Active as u8 {
      EntryStatus::Active
    } else {
      EntryStatus::Deleted
    }
  }

  /// True while the entry has not been tombstoned.
  #[inline]
  pub fn is_active(&self) -> bool {
    self.status() == EntryStatus::Active
  }

  /// Tombstones the entry. Idempotent, and there is no way back to
  /// `Active`; physical removal happens during a later compaction pass on
  /// the owning block.
  ///
  /// This is a plain atomic store, callable without any lock.
  #[inline]
  pub fn mark_deleted(&self) {
    self.status.store(EntryStatus::Deleted as u8, Ordering::Relaxed);
  }

  /// Stamps the entry as accessed right now. Cheap atomic store.
  #[inline]
  pub(crate) fn touch(&self) {
    self.access_time.store(time::now_nanos(), Ordering::Relaxed);
  }

  /// Raw last-hit timestamp in nanoseconds since the cache epoch.
  #[inline]
  pub(crate) fn access_nanos(&self) -> u64 {
    self.access_time.load(Ordering::Relaxed)
  }
}
