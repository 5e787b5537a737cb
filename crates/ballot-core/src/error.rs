//! Error types for `ballot-core`.

use thiserror::Error;

/// A boxed error from a storage backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// A required input was missing or empty.
  #[error("validation failed: {0}")]
  Validation(String),

  /// The backing database or container could not be reached or created.
  #[error("storage unavailable: {0}")]
  StorageUnavailable(#[source] BoxError),

  #[error("storage write failed: {0}")]
  StorageWrite(#[source] BoxError),

  #[error("storage read failed: {0}")]
  StorageRead(#[source] BoxError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
