use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single, static reference point for all timestamps in the cache.
// It is initialized lazily on its first use.
static CACHE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Returns the current time as nanoseconds since the cache epoch.
#[inline]
pub(crate) fn now_nanos() -> u64 {
  Instant::now().saturating_duration_since(*CACHE_EPOCH).as_nanos() as u64
}

/// Converts a `u64` nanosecond timestamp back into an `Instant`.
#[inline]
pub(crate) fn nanos_to_instant(nanos: u64) -> Instant {
  *CACHE_EPOCH + Duration::from_nanos(nanos)
}
