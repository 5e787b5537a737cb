//! The `VoteStore` and `VoteCollection` traits.
//!
//! Implemented by storage backends (`ballot-store-cosmos`,
//! `ballot-store-sqlite`). The service layer and the HTTP layer depend on
//! these abstractions, not on any concrete backend.

use std::future::Future;

use crate::vote::Vote;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Entry point to a durable collection of [`Vote`] records.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait VoteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
  type Collection: VoteCollection<Error = Self::Error>;

  /// Create the database and the vote container if they do not exist yet,
  /// partitioned on [`PARTITION_KEY_PATH`](crate::vote::PARTITION_KEY_PATH).
  ///
  /// Safe to call on every request; an existing container is left untouched.
  fn ensure_collection(
    &self,
  ) -> impl Future<Output = Result<Self::Collection, Self::Error>> + Send + '_;
}

/// A handle to the vote container returned by
/// [`VoteStore::ensure_collection`].
///
/// Writes are append-only: there is no update or delete.
pub trait VoteCollection: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Write one record. Fails on a duplicate `id`.
  fn insert(
    &self,
    vote: Vote,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Return every record in the collection, in no particular order.
  ///
  /// Backends that page internally must follow pagination to completion
  /// before returning.
  fn scan_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Vote>, Self::Error>> + Send + '_;
}
