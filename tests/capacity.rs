use nway_cache::{CacheBuilder, CacheEntry, EvictionPolicy, NWayCache};

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// Single-block caches so every key collides and eviction is deterministic.
fn one_block(nway: usize) -> CacheBuilder<u32, String> {
  CacheBuilder::default()
    .blocks(1)
    .nway(nway)
    .max_entries_per_block(16)
}

fn id_loader(key: &u32) -> Result<String, std::io::Error> {
  Ok(key.to_string())
}

#[test]
fn insert_beyond_nway_evicts_the_oldest() {
  let cache = one_block(2).creation_lru(1).loader(id_loader).build().unwrap();

  cache.put(0, "zero".to_string());
  cache.put(1, "one".to_string());
  cache.put(2, "two".to_string());

  assert!(!cache.contains(&0));
  assert!(cache.contains(&1));
  assert!(cache.contains(&2));
  assert_eq!(cache.metrics().evictions, 1);
}

#[test]
fn live_size_stays_bounded_under_sequential_pressure() {
  let cache = one_block(2).creation_lru(1).loader(id_loader).build().unwrap();

  for i in 0..100 {
    cache.put(i, i.to_string());
    assert!(cache.metrics().current_entries <= 2, "after put {}", i);
  }
}

#[test]
fn mru_evicts_the_newest_entry() {
  let cache = one_block(3).mru(1).loader(id_loader).build().unwrap();

  cache.put(0, "zero".to_string());
  cache.put(1, "one".to_string());
  cache.put(2, "two".to_string());
  cache.put(3, "three".to_string());

  assert!(cache.contains(&0));
  assert!(cache.contains(&1));
  assert!(!cache.contains(&2));
  assert!(cache.contains(&3));
}

#[test]
fn access_expiry_evicts_only_stale_entries() {
  let cache = one_block(2)
    .access_expiry_lru(Duration::from_millis(50))
    .loader(id_loader)
    .build()
    .unwrap();

  cache.put(0, "zero".to_string());
  thread::sleep(Duration::from_millis(100));
  cache.put(1, "one".to_string());
  cache.put(2, "two".to_string());

  assert!(!cache.contains(&0));
  assert!(cache.contains(&1));
  assert!(cache.contains(&2));
}

#[test]
fn access_expiry_makes_progress_when_nothing_expired() {
  let cache = one_block(2)
    .access_expiry_lru(Duration::from_secs(3600))
    .loader(id_loader)
    .build()
    .unwrap();

  cache.put(0, "zero".to_string());
  cache.put(1, "one".to_string());
  cache.put(2, "two".to_string());

  // Nothing was expired, so the pass fell back to the least recently hit.
  assert!(!cache.contains(&0));
  assert!(cache.contains(&1));
  assert!(cache.contains(&2));
}

#[test]
fn a_hit_refreshes_an_entry_against_expiry() {
  let cache = one_block(2)
    .access_expiry_lru(Duration::from_millis(50))
    .loader(id_loader)
    .build()
    .unwrap();

  cache.put(0, "zero".to_string());
  cache.put(1, "one".to_string());
  thread::sleep(Duration::from_millis(100));

  // Both entries are stale, but the hit refreshes key 0.
  assert_eq!(*cache.get(&0).unwrap(), "zero");
  cache.put(2, "two".to_string());

  assert!(cache.contains(&0));
  assert!(!cache.contains(&1));
  assert!(cache.contains(&2));
}

#[test]
fn eviction_snapshot_includes_tombstoned_entries() {
  struct Recorder(Arc<Mutex<Vec<(u32, bool)>>>);

  impl<V> EvictionPolicy<u32, V> for Recorder {
    fn evict(&self, block: &[Arc<CacheEntry<u32, V>>]) {
      let mut seen = self.0.lock().unwrap();
      for entry in block {
        seen.push((*entry.key(), entry.is_active()));
      }
      // Tombstone one live entry so the block can make room.
      if let Some(entry) = block.iter().find(|e| e.is_active()) {
        entry.mark_deleted();
      }
    }
  }

  let seen = Arc::new(Mutex::new(Vec::new()));
  let cache = one_block(2)
    .eviction_policy(Recorder(seen.clone()))
    .loader(id_loader)
    .build()
    .unwrap();

  cache.put(0, "zero".to_string());
  cache.put(1, "one".to_string());
  cache.remove(&0);
  cache.put(2, "two".to_string());

  let seen = seen.lock().unwrap();
  assert!(seen.contains(&(0, false)), "snapshot missed the tombstone: {:?}", *seen);
  assert!(seen.contains(&(1, true)));
}

#[test]
#[should_panic(expected = "max_entries_per_block")]
fn a_policy_that_never_frees_capacity_is_fatal() {
  struct DoNothing;

  impl<K, V> EvictionPolicy<K, V> for DoNothing {
    fn evict(&self, _block: &[Arc<CacheEntry<K, V>>]) {}
  }

  let cache: NWayCache<u32, u32> = CacheBuilder::default()
    .blocks(1)
    .nway(2)
    .max_entries_per_block(4)
    .eviction_policy(DoNothing)
    .loader(|key: &u32| Ok::<_, std::io::Error>(*key))
    .build()
    .unwrap();

  for i in 0..5 {
    cache.put(i, i);
  }
}
