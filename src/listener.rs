use crate::entry::CacheEntry;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
  /// A new value for the same key displaced this entry.
  Replaced,
  /// The caller discarded the entry explicitly.
  User,
  /// The compaction pass physically dropped the entry from its block.
  Evicted,
}

impl fmt::Display for RemovalCause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemovalCause::Replaced => write!(f, "replaced"),
      RemovalCause::User => write!(f, "user"),
      RemovalCause::Evicted => write!(f, "evicted"),
    }
  }
}

/// Immutable snapshot of an entry, taken at the moment an event fires.
///
/// Listeners never see live entries. They get the key, the value `Arc`
/// and the timestamps as they were when the notification was built.
#[derive(Debug, Clone)]
pub struct CacheNotification<K, V> {
  key: K,
  value: Arc<V>,
  creation_time: Instant,
  access_time: Instant,
}

impl<K: Clone, V> CacheNotification<K, V> {
  pub(crate) fn of(entry: &CacheEntry<K, V>) -> Self {
    Self {
      key: entry.key().clone(),
      value: entry.value(),
      creation_time: entry.creation_time(),
      access_time: entry.access_time(),
    }
  }
}

impl<K, V> CacheNotification<K, V> {
  /// The key of the entry the event concerns.
  pub fn key(&self) -> &K {
    &self.key
  }

  /// The entry's value.
  pub fn value(&self) -> &Arc<V> {
    &self.value
  }

  /// When the entry was created.
  pub fn creation_time(&self) -> Instant {
    self.creation_time
  }

  /// When the entry was last returned by a hit.
  pub fn access_time(&self) -> Instant {
    self.access_time
  }
}

/// Snapshot of a removed entry plus the [`RemovalCause`].
#[derive(Debug, Clone)]
pub struct RemovalNotification<K, V> {
  entry: CacheNotification<K, V>,
  cause: RemovalCause,
}

impl<K: Clone, V> RemovalNotification<K, V> {
  pub(crate) fn of(entry: &CacheEntry<K, V>, cause: RemovalCause) -> Self {
    Self {
      entry: CacheNotification::of(entry),
      cause,
    }
  }
}

impl<K, V> RemovalNotification<K, V> {
  /// Why the entry was removed.
  pub fn cause(&self) -> RemovalCause {
    self.cause
  }

  /// The removed entry's key.
  pub fn key(&self) -> &K {
    self.entry.key()
  }

  /// The removed entry's value.
  pub fn value(&self) -> &Arc<V> {
    self.entry.value()
  }

  /// When the removed entry was created.
  pub fn creation_time(&self) -> Instant {
    self.entry.creation_time()
  }

  /// When the removed entry was last returned by a hit.
  pub fn access_time(&self) -> Instant {
    self.entry.access_time()
  }
}

/// Observes entries leaving the cache, whatever the cause.
///
/// Listeners run synchronously on the thread performing the triggering
/// operation, in registration order, and their panics unwind through that
/// operation. Notifications with cause [`RemovalCause::Evicted`] fire
/// while the affected block's write lock is held, so a removal listener
/// must not call back into the cache.
///
/// Any `Fn(&RemovalNotification<K, V>)` closure is a removal listener.
pub trait RemovalListener<K, V>: Send + Sync {
  /// Called once per removed entry.
  fn on_removal(&self, notification: &RemovalNotification<K, V>);
}

impl<K, V, F> RemovalListener<K, V> for F
where
  F: Fn(&RemovalNotification<K, V>) + Send + Sync,
{
  fn on_removal(&self, notification: &RemovalNotification<K, V>) {
    self(notification)
  }
}

/// Observes lookups that missed and are about to invoke the loader.
///
/// Fires after the miss is decided and before the loader runs, outside
/// any lock. Any `Fn(&K)` closure is a miss listener.
pub trait MissListener<K>: Send + Sync {
  /// Called once per miss with the key being loaded.
  fn on_miss(&self, key: &K);
}

impl<K, F> MissListener<K> for F
where
  F: Fn(&K) + Send + Sync,
{
  fn on_miss(&self, key: &K) {
    self(key)
  }
}

/// Observes hits: lookups served from the cache without a load.
///
/// Fires outside any lock, after the entry's access time was stamped. Any
/// `Fn(&CacheNotification<K, V>)` closure is a cached listener.
pub trait CachedListener<K, V>: Send + Sync {
  /// Called once per hit.
  fn on_cached(&self, notification: &CacheNotification<K, V>);
}

impl<K, V, F> CachedListener<K, V> for F
where
  F: Fn(&CacheNotification<K, V>) + Send + Sync,
{
  fn on_cached(&self, notification: &CacheNotification<K, V>) {
    self(notification)
  }
}

/// Handle returned by listener registration. Pass it back to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The three listener lists, each kept in registration order.
///
/// Lists are read-mostly: notification snapshots the relevant list under
/// its read lock, then invokes outside it, so a listener may add or
/// remove listeners without deadlocking the registry.
pub(crate) struct ListenerRegistry<K, V> {
  next_id: AtomicU64,
  removal: RwLock<Vec<(ListenerId, Arc<dyn RemovalListener<K, V>>)>>,
  miss: RwLock<Vec<(ListenerId, Arc<dyn MissListener<K>>)>>,
  cached: RwLock<Vec<(ListenerId, Arc<dyn CachedListener<K, V>>)>>,
}

impl<K, V> ListenerRegistry<K, V> {
  pub(crate) fn new() -> Self {
    Self {
      next_id: AtomicU64::new(0),
      removal: RwLock::new(Vec::new()),
      miss: RwLock::new(Vec::new()),
      cached: RwLock::new(Vec::new()),
    }
  }

  fn next_id(&self) -> ListenerId {
    ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
  }

  pub(crate) fn add_removal(&self, listener: Arc<dyn RemovalListener<K, V>>) -> ListenerId {
    let id = self.next_id();
    self.removal.write().push((id, listener));
    id
  }

  pub(crate) fn remove_removal(&self, id: ListenerId) {
    self.removal.write().retain(|(lid, _)| *lid != id);
  }

  pub(crate) fn add_miss(&self, listener: Arc<dyn MissListener<K>>) -> ListenerId {
    let id = self.next_id();
    self.miss.write().push((id, listener));
    id
  }

  pub(crate) fn remove_miss(&self, id: ListenerId) {
    self.miss.write().retain(|(lid, _)| *lid != id);
  }

  pub(crate) fn add_cached(&self, listener: Arc<dyn CachedListener<K, V>>) -> ListenerId {
    let id = self.next_id();
    self.cached.write().push((id, listener));
    id
  }

  pub(crate) fn remove_cached(&self, id: ListenerId) {
    self.cached.write().retain(|(lid, _)| *lid != id);
  }

  /// Fires every removal listener, in registration order.
  ///
  /// The notification is built once and only if at least one listener is
  /// registered.
  pub(crate) fn notify_removal(&self, entry: &CacheEntry<K, V>, cause: RemovalCause)
  where
    K: Clone,
  {
    let listeners: Vec<_> = {
      let guard = self.removal.read();
      if guard.is_empty() {
        return;
      }
      guard.iter().map(|(_, l)| l.clone()).collect()
    };

    let notification = RemovalNotification::of(entry, cause);
    for listener in listeners {
      listener.on_removal(&notification);
    }
  }

  /// Fires every miss listener, in registration order.
  pub(crate) fn notify_miss(&self, key: &K) {
    let listeners: Vec<_> = {
      let guard = self.miss.read();
      if guard.is_empty() {
        return;
      }
      guard.iter().map(|(_, l)| l.clone()).collect()
    };

    for listener in listeners {
      listener.on_miss(key);
    }
  }

  /// Fires every cached listener, in registration order.
  pub(crate) fn notify_cached(&self, entry: &CacheEntry<K, V>)
  where
    K: Clone,
  {
    let listeners: Vec<_> = {
      let guard = self.cached.read();
      if guard.is_empty() {
        return;
      }
      guard.iter().map(|(_, l)| l.clone()).collect()
    };

    let notification = CacheNotification::of(entry);
    for listener in listeners {
      listener.on_cached(&notification);
    }
  }
}
