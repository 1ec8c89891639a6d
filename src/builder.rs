//! Fluent construction and validation of cache instances.

use crate::cache::NWayCache;
use crate::error::BuildError;
use crate::listener::ListenerRegistry;
use crate::loader::CacheLoader;
use crate::metrics::Metrics;
use crate::policy::{AccessExpiryLru, CreationLru, EvictionPolicy, Mru};
use crate::shared::CacheShared;
use crate::store::BlockStore;

use std::fmt;
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::Duration;

/// Which eviction policy `build` should assemble.
///
/// A closed set of reference policies, each variant carrying its own
/// parameters; anything else enters through
/// [`CacheBuilder::eviction_policy`] as a ready-made object.
enum EvictionChoice<K, V> {
  CreationLru { entries_to_delete: usize },
  AccessExpiryLru { expiration: Duration },
  Mru { entries_to_delete: usize },
  Custom(Arc<dyn EvictionPolicy<K, V>>),
}

impl<K, V> fmt::Debug for EvictionChoice<K, V> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EvictionChoice::CreationLru { entries_to_delete } => f
        .debug_struct("CreationLru")
        .field("entries_to_delete", entries_to_delete)
        .finish(),
      EvictionChoice::AccessExpiryLru { expiration } => f
        .debug_struct("AccessExpiryLru")
        .field("expiration", expiration)
        .finish(),
      EvictionChoice::Mru { entries_to_delete } => f
        .debug_struct("Mru")
        .field("entries_to_delete", entries_to_delete)
        .finish(),
      EvictionChoice::Custom(_) => f.write_str("Custom"),
    }
  }
}

/// A builder for [`NWayCache`] instances.
///
/// Every knob has a default: 50 blocks, 5-way blocks with a hard ceiling
/// of 10 entries each, and creation-order LRU eviction deleting 2 entries
/// per pass. Only the [`loader`](CacheBuilder::loader) is mandatory.
/// Validation is fail-fast: [`build`](CacheBuilder::build) rejects any
/// invalid combination before the cache exists.
///
/// ```
/// use nway_cache::CacheBuilder;
/// use std::time::Duration;
///
/// let cache = CacheBuilder::default()
///   .blocks(64)
///   .nway(8)
///   .max_entries_per_block(16)
///   .access_expiry_lru(Duration::from_secs(300))
///   .loader(|key: &String| Ok::<_, std::io::Error>(key.len()))
///   .build()
///   .unwrap();
///
/// assert_eq!(*cache.get(&"hello".to_string()).unwrap(), 5);
/// ```
pub struct CacheBuilder<K, V, H = ahash::RandomState> {
  blocks: usize,
  nway: usize,
  max_entries_per_block: usize,
  eviction: EvictionChoice<K, V>,
  loader: Option<Arc<dyn CacheLoader<K, V>>>,
  hasher: H,
}

impl<K, V, H> CacheBuilder<K, V, H>
where
  H: BuildHasher + Default,
{
  /// Creates a builder with the default configuration.
  pub fn new() -> Self {
    Self {
      blocks: 50,
      nway: 5,
      max_entries_per_block: 10,
      eviction: EvictionChoice::CreationLru {
        entries_to_delete: 2,
      },
      loader: None,
      hasher: H::default(),
    }
  }
}

impl<K, V> Default for CacheBuilder<K, V, ahash::RandomState> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K, V, H> CacheBuilder<K, V, H> {
  /// Sets the number of blocks the key space shards into. Must be at
  /// least 1. More blocks mean less lock contention between keys.
  pub fn blocks(mut self, blocks: usize) -> Self {
    self.blocks = blocks;
    self
  }

  /// Sets how many live entries one block holds before an insert triggers
  /// the eviction policy. Must be at least 1.
  pub fn nway(mut self, nway: usize) -> Self {
    self.nway = nway;
    self
  }

  /// Sets the hard per-block ceiling. Reaching it is treated as resource
  /// exhaustion and panics, so it should sit comfortably above `nway` to
  /// absorb the transient overshoot of concurrent inserts.
  pub fn max_entries_per_block(mut self, max_entries_per_block: usize) -> Self {
    self.max_entries_per_block = max_entries_per_block;
    self
  }

  /// Selects creation-order LRU eviction tombstoning `entries_to_delete`
  /// entries per pass. This is the default policy with
  /// `entries_to_delete` of 2.
  pub fn creation_lru(mut self, entries_to_delete: usize) -> Self {
    self.eviction = EvictionChoice::CreationLru { entries_to_delete };
    self
  }

  /// Selects access-expiry eviction: entries not hit for `expiration`
  /// are tombstoned, and a pass that finds none expired tombstones the
  /// least recently hit entry instead.
  pub fn access_expiry_lru(mut self, expiration: Duration) -> Self {
    self.eviction = EvictionChoice::AccessExpiryLru { expiration };
    self
  }

  /// Selects MRU eviction tombstoning the `entries_to_delete` newest
  /// entries per pass.
  pub fn mru(mut self, entries_to_delete: usize) -> Self {
    self.eviction = EvictionChoice::Mru { entries_to_delete };
    self
  }

  /// Supplies a custom eviction policy, replacing the reference policies.
  pub fn eviction_policy(mut self, policy: impl EvictionPolicy<K, V> + 'static) -> Self {
    self.eviction = EvictionChoice::Custom(Arc::new(policy));
    self
  }

  /// Sets the read-through loader invoked on every miss. Mandatory.
  pub fn loader(mut self, loader: impl CacheLoader<K, V> + 'static) -> Self {
    self.loader = Some(Arc::new(loader));
    self
  }

  /// Replaces the hasher state used to route keys to blocks.
  pub fn hasher(mut self, hasher: H) -> Self {
    self.hasher = hasher;
    self
  }
}

impl<K, V, H> CacheBuilder<K, V, H>
where
  H: BuildHasher,
{
  /// Validates the configuration and assembles the cache.
  ///
  /// Fails fast with a [`BuildError`] describing the first problem found;
  /// nothing is allocated until the configuration is known to be sound.
  pub fn build(self) -> Result<NWayCache<K, V, H>, BuildError> {
    if self.blocks == 0 {
      return Err(BuildError::ZeroBlocks);
    }
    if self.nway == 0 {
      return Err(BuildError::ZeroNway);
    }
    if self.max_entries_per_block < self.nway {
      return Err(BuildError::MaxBelowNway {
        max_entries_per_block: self.max_entries_per_block,
        nway: self.nway,
      });
    }
    let loader = self.loader.ok_or(BuildError::MissingLoader)?;

    let eviction: Arc<dyn EvictionPolicy<K, V>> = match self.eviction {
      EvictionChoice::CreationLru { entries_to_delete } => {
        Arc::new(CreationLru::new(entries_to_delete)?)
      }
      EvictionChoice::AccessExpiryLru { expiration } => {
        Arc::new(AccessExpiryLru::new(expiration)?)
      }
      EvictionChoice::Mru { entries_to_delete } => Arc::new(Mru::new(entries_to_delete)?),
      EvictionChoice::Custom(policy) => policy,
    };

    Ok(NWayCache {
      shared: Arc::new(CacheShared {
        store: BlockStore::new(self.blocks, self.hasher),
        nway: self.nway,
        max_entries_per_block: self.max_entries_per_block,
        eviction,
        loader,
        listeners: ListenerRegistry::new(),
        metrics: Metrics::new(),
      }),
    })
  }
}

impl<K, V, H> fmt::Debug for CacheBuilder<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("blocks", &self.blocks)
      .field("nway", &self.nway)
      .field("max_entries_per_block", &self.max_entries_per_block)
      .field("eviction", &self.eviction)
      .field("has_loader", &self.loader.is_some())
      .finish_non_exhaustive()
  }
}
