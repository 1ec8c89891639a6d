use crate::entry::CacheEntry;

use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use equivalent::Equivalent;
use parking_lot::RwLock;

/// Hashes a key with the store's `BuildHasher`.
#[inline]
pub(crate) fn hash_key<Q, H>(hasher: &H, key: &Q) -> u64
where
  Q: Hash + ?Sized,
  H: BuildHasher,
{
  let mut state = hasher.build_hasher();
  key.hash(&mut state);
  state.finish()
}

/// One shard of the cache: an insertion-ordered sequence of entries behind
/// a reader/writer lock.
///
/// Appends go to the tail, so position zero is always the oldest surviving
/// entry. Structural changes (compaction, append) happen under the write
/// lock; lookups and eviction snapshots take the read lock.
pub(crate) struct Block<K, V> {
  pub(crate) entries: RwLock<Vec<Arc<CacheEntry<K, V>>>>,
}

impl<K, V> Block<K, V> {
  fn new() -> Self {
    Self {
      entries: RwLock::new(Vec::new()),
    }
  }

  /// Number of entries physically present, tombstoned ones included.
  pub(crate) fn len(&self) -> usize {
    self.entries.read().len()
  }

  /// Copies the entry sequence under the read lock. The copy feeds the
  /// eviction policy, which then runs without any lock held.
  pub(crate) fn snapshot(&self) -> Vec<Arc<CacheEntry<K, V>>> {
    self.entries.read().clone()
  }

  /// Collects the live entries matching `key` under the read lock.
  ///
  /// The steady state is zero or one match. Concurrent miss-and-load races
  /// can briefly leave several, which the engine repairs when a lookup
  /// observes them.
  pub(crate) fn find_active<Q>(&self, key: &Q) -> Vec<Arc<CacheEntry<K, V>>>
  where
    Q: Equivalent<K> + ?Sized,
  {
    self
      .entries
      .read()
      .iter()
      .filter(|entry| entry.is_active() && key.equivalent(entry.key()))
      .cloned()
      .collect()
  }
}

/// The fixed array of blocks plus the hasher that routes keys to them.
///
/// Each block sits in its own cache line and carries its own lock, so
/// operations on keys of different blocks never contend. The block count
/// is fixed at construction; a key maps to the same block for the life of
/// the store.
pub(crate) struct BlockStore<K, V, H> {
  blocks: Box<[CachePadded<Block<K, V>>]>,
  hasher: H,
}

impl<K, V, H> BlockStore<K, V, H>
where
  H: BuildHasher,
{
  pub(crate) fn new(num_blocks: usize, hasher: H) -> Self {
    let mut blocks = Vec::with_capacity(num_blocks);
    for _ in 0..num_blocks {
      blocks.push(CachePadded::new(Block::new()));
    }
    Self {
      blocks: blocks.into_boxed_slice(),
      hasher,
    }
  }

  /// Returns the block responsible for `key`, at index
  /// `hash(key) % num_blocks`.
  #[inline]
  pub(crate) fn block_for<Q>(&self, key: &Q) -> &Block<K, V>
  where
    Q: Hash + ?Sized,
  {
    let hash = hash_key(&self.hasher, key);
    let index = hash as usize % self.blocks.len();
    &self.blocks[index]
  }
}

impl<K, V, H> BlockStore<K, V, H> {
  pub(crate) fn num_blocks(&self) -> usize {
    self.blocks.len()
  }
}

impl<K, V, H> fmt::Debug for BlockStore<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BlockStore")
      .field("num_blocks", &self.blocks.len())
      .finish_non_exhaustive()
  }
}
