use std::error::Error;

/// The boxed error type a loader may fail with.
pub type LoadError = Box<dyn Error + Send + Sync>;

/// Supplies the value for a key the cache does not hold.
///
/// Every cache has exactly one loader and every miss goes through it: the
/// engine calls `load` entirely outside the block locks, so a slow or
/// blocking loader never stalls readers of other keys.
///
/// There is no single-flight guarantee. Concurrent misses on the same key
/// may each invoke the loader (at-least-once semantics), briefly leaving
/// duplicate entries that the cache tombstones and reloads once a lookup
/// observes them. Loaders should therefore be idempotent.
///
/// Any `Fn(&K) -> Result<V, E>` closure is a loader, for any error type
/// convertible into the boxed [`LoadError`]:
///
/// ```
/// use nway_cache::CacheBuilder;
///
/// let cache = CacheBuilder::default()
///   .loader(|key: &u32| Ok::<_, std::io::Error>(key.to_string()))
///   .build()
///   .unwrap();
/// assert_eq!(*cache.get(&7).unwrap(), "7");
/// ```
pub trait CacheLoader<K, V>: Send + Sync {
  /// Produces the value for `key`, or the reason it could not.
  fn load(&self, key: &K) -> Result<V, LoadError>;
}

impl<K, V, F, E> CacheLoader<K, V> for F
where
  F: Fn(&K) -> Result<V, E> + Send + Sync,
  E: Into<LoadError>,
{
  fn load(&self, key: &K) -> Result<V, LoadError> {
    self(key).map_err(Into::into)
  }
}
