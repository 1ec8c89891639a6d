use super::EvictionPolicy;
use crate::entry::CacheEntry;
use crate::error::BuildError;

use std::sync::Arc;

/// Creation-order LRU: tombstones the oldest entries of the block.
///
/// Blocks keep entries in insertion order, so the head of the snapshot is
/// the longest-resident entry. Each pass marks the first
/// `entries_to_delete` entries, regardless of how recently they were hit.
/// This is the default policy.
#[derive(Debug, Clone)]
pub struct CreationLru {
  entries_to_delete: usize,
}

impl CreationLru {
  /// Creates the policy. `entries_to_delete` must be at least 1.
  pub fn new(entries_to_delete: usize) -> Result<Self, BuildError> {
    if entries_to_delete == 0 {
      return Err(BuildError::ZeroEntriesToDelete);
    }
    Ok(Self { entries_to_delete })
  }
}

impl<K, V> EvictionPolicy<K, V> for CreationLru {
  fn evict(&self, block: &[Arc<CacheEntry<K, V>>]) {
    for entry in block.iter().take(self.entries_to_delete) {
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

  fn statuses(block: &[Arc<CacheEntry<u32, String>>]) -> Vec<EntryStatus> {
    block.iter().map(|e| e.status()).collect()
  }

  #[test]
  fn rejects_zero_entries_to_delete() {
    assert_eq!(
      CreationLru::new(0).unwrap_err(),
      BuildError::ZeroEntriesToDelete
    );
  }

  #[test]
  fn marks_the_single_oldest_entry() {
    let policy = CreationLru::new(1).unwrap();
    let block = block_of(10);
    policy.evict(&block);

    let statuses = statuses(&block);
    assert_eq!(statuses[0], EntryStatus::Deleted);
    assert!(statuses[1..].iter().all(|s| *s == EntryStatus::Active));
  }

  #[test]
  fn marks_the_three_oldest_entries() {
    let policy = CreationLru::new(3).unwrap();
    let block = block_of(10);
    policy.evict(&block);

    let statuses = statuses(&block);
    assert!(statuses[..3].iter().all(|s| *s == EntryStatus::Deleted));
    assert!(statuses[3..].iter().all(|s| *s == EntryStatus::Active));
  }

  #[test]
  fn marking_more_than_the_block_holds_marks_everything() {
    let policy = CreationLru::new(16).unwrap();
    let block = block_of(10);
    policy.evict(&block);

    assert!(block.iter().all(|e| e.status() == EntryStatus::Deleted));
  }

  #[test]
  fn empty_block_is_a_no_op() {
    let policy = CreationLru::new(2).unwrap();
    let block: Vec<Arc<CacheEntry<u32, String>>> = Vec::new();
    policy.evict(&block);
  }
}
