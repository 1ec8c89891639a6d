//! Lock-free cache statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// Internal event counters for one cache instance.
///
/// Every counter is a padded atomic updated with relaxed ordering; a
/// snapshot is therefore not a consistent cut across counters, only a
/// close approximation, which is all cache statistics need.
pub(crate) struct Metrics {
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) misses: CachePadded<AtomicU64>,
  pub(crate) loads: CachePadded<AtomicU64>,
  pub(crate) load_failures: CachePadded<AtomicU64>,
  pub(crate) inserts: CachePadded<AtomicU64>,
  pub(crate) replacements: CachePadded<AtomicU64>,
  pub(crate) removals: CachePadded<AtomicU64>,
  pub(crate) evictions: CachePadded<AtomicU64>,
  pub(crate) current_entries: CachePadded<AtomicU64>,
  created_at: Instant,
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      misses: CachePadded::new(AtomicU64::new(0)),
      loads: CachePadded::new(AtomicU64::new(0)),
      load_failures: CachePadded::new(AtomicU64::new(0)),
      inserts: CachePadded::new(AtomicU64::new(0)),
      replacements: CachePadded::new(AtomicU64::new(0)),
      removals: CachePadded::new(AtomicU64::new(0)),
      evictions: CachePadded::new(AtomicU64::new(0)),
      current_entries: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }

  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let misses = self.misses.load(Ordering::Relaxed);
    let lookups = hits + misses;
    let hit_ratio = if lookups == 0 {
      0.0
    } else {
      hits as f64 / lookups as f64
    };

    MetricsSnapshot {
      hits,
      misses,
      hit_ratio,
      loads: self.loads.load(Ordering::Relaxed),
      load_failures: self.load_failures.load(Ordering::Relaxed),
      inserts: self.inserts.load(Ordering::Relaxed),
      replacements: self.replacements.load(Ordering::Relaxed),
      removals: self.removals.load(Ordering::Relaxed),
      evictions: self.evictions.load(Ordering::Relaxed),
      current_entries: self.current_entries.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time view of a cache's counters.
#[derive(Clone, Copy)]
pub struct MetricsSnapshot {
  /// Lookups served from the cache without a load.
  pub hits: u64,
  /// Lookups that found no live entry and went to the loader. Includes
  /// the duplicate-repair reloads.
  pub misses: u64,
  /// `hits / (hits + misses)`, or `0.0` before the first lookup.
  pub hit_ratio: f64,
  /// Loader invocations, successful or not.
  pub loads: u64,
  /// Loader invocations that returned an error.
  pub load_failures: u64,
  /// Entries appended to a block.
  pub inserts: u64,
  /// Entries displaced because a new value arrived for their key.
  pub replacements: u64,
  /// Entries tombstoned by an explicit remove call.
  pub removals: u64,
  /// Entries physically dropped by compaction passes.
  pub evictions: u64,
  /// Entries physically present right now, tombstoned ones included.
  pub current_entries: u64,
  /// Seconds since the cache was built.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("misses", &self.misses)
      .field("hit_ratio", &format_args!("{:.4}", self.hit_ratio))
      .field("loads", &self.loads)
      .field("load_failures", &self.load_failures)
      .field("inserts", &self.inserts)
      .field("replacements", &self.replacements)
      .field("removals", &self.removals)
      .field("evictions", &self.evictions)
      .field("current_entries", &self.current_entries)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}
