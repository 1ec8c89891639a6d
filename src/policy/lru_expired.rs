use super::EvictionPolicy;
use crate::entry::CacheEntry;
use crate::error::BuildError;
use crate::time;

use std::sync::Arc;
use std::time::Duration;

/// Access-expiry LRU: tombstones every entry whose last hit is older than
/// the configured expiration.
///
/// When nothing in the block has expired yet, the pass still tombstones
/// exactly one entry, the one with the smallest access time (the first
/// such entry on ties). An eviction pass that marked nothing would leave
/// the block permanently over capacity.
#[derive(Debug, Clone)]
pub struct AccessExpiryLru {
  expiration: Duration,
}

impl AccessExpiryLru {
  /// Creates the policy. `expiration` must be greater than zero.
  pub fn new(expiration: Duration) -> Result<Self, BuildError> {
    if expiration.is_zero() {
      return Err(BuildError::ZeroExpiration);
    }
    Ok(Self { expiration })
  }
}

impl<K, V> EvictionPolicy<K, V> for AccessExpiryLru {
  fn evict(&self, block: &[Arc<CacheEntry<K, V>>]) {
    if block.is_empty() {
      return;
    }

    let now = time::now_nanos();
    let expiration = self.expiration.as_nanos() as u64;

    let mut expired_any = false;
    let mut oldest: Option<&Arc<CacheEntry<K, V>>> = None;
    let mut oldest_access = u64::MAX;

    for entry in block {
      let accessed = entry.access_nanos();
      if now > accessed.saturating_add(expiration) {
        entry.mark_deleted();
        expired_any = true;
      }
      if accessed < oldest_access {
        oldest_access = accessed;
        oldest = Some(entry);
      }
    }

    if !expired_any {
      if let Some(entry) = oldest {
        entry.mark_deleted();
      }
    }
  }
}
