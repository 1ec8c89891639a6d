//! Eviction policies.
//!
//! A policy never removes anything. It inspects a snapshot of an
//! over-capacity block and tombstones its victims with
//! [`CacheEntry::mark_deleted`]; the engine's compaction pass does the
//! physical removal under the block's write lock.

pub mod lru;
pub mod lru_expired;
pub mod mru;

use crate::entry::CacheEntry;

use std::sync::Arc;

pub use lru::CreationLru;
pub use lru_expired::AccessExpiryLru;
pub use mru::Mru;

/// A pluggable eviction algorithm.
///
/// `evict` receives the block's entry sequence as a snapshot copied under
/// the read lock, in insertion order and possibly already containing
/// tombstoned entries. The engine calls it without holding any lock, so an
/// implementation may be arbitrarily slow without blocking readers.
///
/// Implementations must be infallible at eviction time: parameter
/// validation belongs in the policy's constructor. A pass that tombstones
/// nothing is legal but leaves the block over capacity, and a policy that
/// never makes progress eventually trips the hard per-block ceiling.
pub trait EvictionPolicy<K, V>: Send + Sync {
  /// Tombstones this pass's victims among `block`.
  fn evict(&self, block: &[Arc<CacheEntry<K, V>>]);
}
