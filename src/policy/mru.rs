use super::EvictionPolicy;
use crate::entry::CacheEntry;
use crate::error::BuildError;

use std::sync::Arc;

/// MRU: tombstones the newest entries of the block.
///
/// The mirror image of [`CreationLru`](super::CreationLru): each pass
/// walks the snapshot from the tail and marks the last
/// `entries_to_delete` entries. Useful when fresh insertions are the least
/// likely to be asked for again, as in scan-heavy workloads.
#[derive(Debug, Clone)]
pub struct Mru {
  entries_to_delete: usize,
}

impl Mru {
  /// Creates the policy. `entries_to_delete` must be at least 1.
  pub fn new(entries_to_delete: usize) -> Result<Self, BuildError> {
    if entries_to_delete == 0 {
      return Err(BuildError::ZeroEntriesToDelete);
    }
    Ok(Self { entries_to_delete })
  }
}

impl<K, V> EvictionPolicy<K, V> for Mru {
  fn evict(&self, block: &[Arc<CacheEntry<K, V>>]) {
    for entry in block.iter().rev().take(self.entries_to_delete) {
      entry.mark_deleted();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entry::EntryStatus;

  fn block_of(len: usize) -> Vec<Arc<CacheEntry<u32, String>>> {
    (0..len)
      .map(|i| Arc::new(CacheEntry::new(i as u32, format!("value-{}", i))))
      .collect()
  }

  #[test]
  fn rejects_zero_entries_to_delete() {
    assert_eq!(Mru::new(0).unwrap_err(), BuildError::ZeroEntriesToDelete);
  }

  #[test]
  fn marks_the_single_newest_entry() {
    let policy = Mru::new(1).unwrap();
    let block = block_of(10);
    policy.evict(&block);

    assert_eq!(block[9].status(), EntryStatus::Deleted);
    assert!(block[..9].iter().all(|e| e.status() == EntryStatus::Active));
  }

  #[test]
  fn marks_the_three_newest_entries() {
    let policy = Mru::new(3).unwrap();
    let block = block_of(10);
    policy.evict(&block);

    assert!(block[7..].iter().all(|e| e.status() == EntryStatus::Deleted));
    assert!(block[..7].iter().all(|e| e.status() == EntryStatus::Active));
  }

  #[test]
  fn marking_more_than_the_block_holds_marks_everything() {
    let policy = Mru::new(64).unwrap();
    let block = block_of(10);
    policy.evict(&block);

    assert!(block.iter().all(|e| e.status() == EntryStatus::Deleted));
  }

  #[test]
  fn empty_block_is_a_no_op() {
    let policy = Mru::new(2).unwrap();
    let block: Vec<Arc<CacheEntry<u32, String>>> = Vec::new();
    policy.evict(&block);
  }
}
