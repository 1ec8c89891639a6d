use std::error::Error;
use std::fmt;

/// Errors reported while assembling a cache.
///
/// Every invalid configuration is rejected by [`CacheBuilder::build`]
/// (or by a reference policy's constructor) before any engine exists, so
/// the operational code never re-validates parameters.
///
/// [`CacheBuilder::build`]: crate::builder::CacheBuilder::build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
  /// The cache was configured with zero blocks.
  ZeroBlocks,
  /// The cache was configured with a zero-entry live capacity per block.
  ZeroNway,
  /// `max_entries_per_block` is smaller than `nway`, which leaves no room
  /// for the transient overshoot produced by evicting outside the lock.
  MaxBelowNway {
    /// The configured hard ceiling.
    max_entries_per_block: usize,
    /// The configured live capacity.
    nway: usize,
  },
  /// A batch eviction policy was asked to delete zero entries per pass.
  ZeroEntriesToDelete,
  /// The access-expiry eviction policy was given a zero expiration.
  ZeroExpiration,
  /// No loader was supplied. The read-through protocol requires one.
  MissingLoader,
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroBlocks => write!(f, "number of blocks must be at least 1"),
      BuildError::ZeroNway => write!(f, "nway must be at least 1"),
      BuildError::MaxBelowNway {
        max_entries_per_block,
        nway,
      } => write!(
        f,
        "max_entries_per_block ({}) must be at least nway ({})",
        max_entries_per_block, nway
      ),
      BuildError::ZeroEntriesToDelete => {
        write!(f, "entries_to_delete must be at least 1")
      }
      BuildError::ZeroExpiration => {
        write!(f, "expiration must be greater than zero")
      }
      BuildError::MissingLoader => write!(f, "a cache loader is required"),
    }
  }
}

impl Error for BuildError {}

/// Error returned by a read-through lookup when the loader fails to
/// produce a value for a missing key.
///
/// The loader's own error is preserved and reachable through
/// [`source`](Error::source) or [`into_source`](CacheLoaderError::into_source).
#[derive(Debug)]
pub struct CacheLoaderError {
  source: Box<dyn Error + Send + Sync>,
}

impl CacheLoaderError {
  pub(crate) fn new(source: Box<dyn Error + Send + Sync>) -> Self {
    Self { source }
  }

  /// Consumes the wrapper and returns the loader's original error.
  pub fn into_source(self) -> Box<dyn Error + Send + Sync> {
    self.source
  }
}

impl fmt::Display for CacheLoaderError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "cache loader failed: {}", self.source)
  }
}

impl Error for CacheLoaderError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    Some(&*self.source)
  }
}
