//! An embeddable, thread-safe, read-through N-way set-associative cache.
//!
//! Keys hash into a fixed number of independent **blocks**, each guarded
//! by its own reader/writer lock and holding at most `nway` live entries.
//! An insert into a full block hands a snapshot of the block to a
//! pluggable eviction policy, which **tombstones** its victims; the next
//! insert into the block compacts tombstoned entries out. Misses resolve
//! through a mandatory [`CacheLoader`], invoked outside every lock.
//!
//! # Highlights
//!
//! * **Bounded locking.** One `RwLock` per block and no global lock; the
//!   loader and the eviction policy both run with no lock held.
//! * **Read-through.** [`get`](NWayCache::get) either hits or loads; a
//!   loader failure surfaces as [`CacheLoaderError`] and caches nothing.
//!   Concurrent misses on one key may each load (at-least-once), and the
//!   cache repairs the resulting duplicates when a lookup observes them.
//! * **Tombstone deletion.** [`remove`](NWayCache::remove) and eviction
//!   only flip an atomic status; physical removal is deferred to the next
//!   insert on the block, keeping removals lock-light.
//! * **Pluggable eviction.** Creation-order LRU, access-expiry LRU and
//!   MRU ship as reference policies; any [`EvictionPolicy`] works.
//! * **Observability.** Removal, miss and cached listeners fire
//!   synchronously in registration order, and lock-free counters are
//!   available as a [`MetricsSnapshot`] at any time.
//!
//! # Quick start
//!
//! ```
//! use nway_cache::{CacheBuilder, RemovalCause};
//!
//! let cache = CacheBuilder::default()
//!   .blocks(32)
//!   .nway(4)
//!   .max_entries_per_block(8)
//!   .creation_lru(1)
//!   .loader(|key: &u64| Ok::<_, std::io::Error>(format!("user-{}", key)))
//!   .build()
//!   .unwrap();
//!
//! cache.add_removal_listener(|n: &nway_cache::RemovalNotification<u64, String>| {
//!   if n.cause() == RemovalCause::User {
//!     println!("{} was removed by the caller", n.key());
//!   }
//! });
//!
//! let value = cache.get(&7).unwrap(); // miss: loaded
//! assert_eq!(*value, "user-7");
//! assert_eq!(*cache.get(&7).unwrap(), "user-7"); // hit
//!
//! cache.put(7, "override".to_string());
//! cache.remove(&7);
//! assert!(!cache.contains(&7));
//! ```

pub mod builder;
pub mod entry;
pub mod error;
pub mod listener;
pub mod loader;
pub mod metrics;
pub mod policy;

mod cache;
mod shared;
mod store;
mod time;

pub use builder::CacheBuilder;
pub use cache::NWayCache;
pub use entry::{CacheEntry, EntryStatus};
pub use error::{BuildError, CacheLoaderError};
pub use listener::{
  CacheNotification, CachedListener, ListenerId, MissListener, RemovalCause, RemovalListener,
  RemovalNotification,
};
pub use loader::{CacheLoader, LoadError};
pub use metrics::MetricsSnapshot;
pub use policy::{AccessExpiryLru, CreationLru, EvictionPolicy, Mru};
