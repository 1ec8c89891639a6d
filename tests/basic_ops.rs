use nway_cache::{CacheBuilder, NWayCache};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// Loader that counts its invocations so tests can tell hits from loads.
fn counted_cache(calls: Arc<AtomicUsize>) -> NWayCache<u32, String> {
  CacheBuilder::default()
    .loader(move |key: &u32| {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok::<_, std::io::Error>(format!("loaded-{}", key))
    })
    .build()
    .unwrap()
}

#[test]
fn put_then_get_hits_without_loading() {
  let calls = Arc::new(AtomicUsize::new(0));
  let cache = counted_cache(calls.clone());

  cache.put(1, "one".to_string());
  assert_eq!(*cache.get(&1).unwrap(), "one");
  assert_eq!(calls.load(Ordering::SeqCst), 0);

  let m = cache.metrics();
  assert_eq!(m.hits, 1);
  assert_eq!(m.misses, 0);
  assert_eq!(m.inserts, 1);
}

#[test]
fn get_miss_loads_once_and_caches() {
  let calls = Arc::new(AtomicUsize::new(0));
  let cache = counted_cache(calls.clone());

  assert_eq!(*cache.get(&7).unwrap(), "loaded-7");
  assert_eq!(*cache.get(&7).unwrap(), "loaded-7");
  assert_eq!(calls.load(Ordering::SeqCst), 1);

  let m = cache.metrics();
  assert_eq!(m.misses, 1);
  assert_eq!(m.hits, 1);
  assert_eq!(m.loads, 1);
  assert_eq!(m.load_failures, 0);
}

#[test]
fn put_replaces_the_existing_value() {
  let calls = Arc::new(AtomicUsize::new(0));
  let cache = counted_cache(calls.clone());

  cache.put(1, "first".to_string());
  cache.put(1, "second".to_string());
  assert_eq!(*cache.get(&1).unwrap(), "second");
  assert_eq!(calls.load(Ordering::SeqCst), 0);

  let m = cache.metrics();
  assert_eq!(m.replacements, 1);
  // The displaced entry was compacted out when the new one was inserted.
  assert_eq!(m.evictions, 1);
  assert_eq!(m.current_entries, 1);
}

#[test]
fn remove_then_get_reloads() {
  let calls = Arc::new(AtomicUsize::new(0));
  let cache = counted_cache(calls.clone());

  cache.put(1, "one".to_string());
  cache.remove(&1);
  assert!(!cache.contains(&1));

  assert_eq!(*cache.get(&1).unwrap(), "loaded-1");
  assert_eq!(calls.load(Ordering::SeqCst), 1);
  assert_eq!(cache.metrics().removals, 1);
}

#[test]
fn removing_an_absent_key_is_a_no_op() {
  let calls = Arc::new(AtomicUsize::new(0));
  let cache = counted_cache(calls.clone());

  cache.remove(&99);
  assert_eq!(cache.metrics().removals, 0);
  assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn peek_never_loads_and_never_counts() {
  let calls = Arc::new(AtomicUsize::new(0));
  let cache = counted_cache(calls.clone());

  assert!(cache.peek(&1).is_none());
  cache.put(1, "one".to_string());
  assert_eq!(*cache.peek(&1).unwrap(), "one");

  assert_eq!(calls.load(Ordering::SeqCst), 0);
  let m = cache.metrics();
  assert_eq!(m.hits, 0);
  assert_eq!(m.misses, 0);
}

#[test]
fn values_are_shared_not_cloned() {
  // The value type deliberately has no Clone impl.
  struct Opaque(u32);

  let cache = CacheBuilder::default()
    .loader(|key: &u32| Ok::<_, std::io::Error>(Opaque(*key)))
    .build()
    .unwrap();

  let a = cache.get(&5).unwrap();
  let b = cache.get(&5).unwrap();
  assert!(Arc::ptr_eq(&a, &b));
  assert_eq!(a.0, 5);
}

#[test]
fn borrowed_key_lookups_work_for_string_keys() {
  let cache = CacheBuilder::default()
    .loader(|key: &String| Ok::<_, std::io::Error>(key.len()))
    .build()
    .unwrap();

  cache.put("hello".to_string(), 99);
  assert!(cache.contains("hello"));
  assert_eq!(*cache.peek("hello").unwrap(), 99);

  cache.remove("hello");
  assert!(!cache.contains("hello"));
}

#[test]
fn handles_share_one_engine() {
  let calls = Arc::new(AtomicUsize::new(0));
  let cache = counted_cache(calls.clone());
  let other = cache.clone();

  other.put(1, "one".to_string());
  assert_eq!(*cache.get(&1).unwrap(), "one");
  assert_eq!(cache.metrics().hits, other.metrics().hits);
}
