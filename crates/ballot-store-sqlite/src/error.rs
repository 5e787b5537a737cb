//! Error type for `ballot-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A document with this id already exists in the collection.
  #[error("document {id} already exists in collection {collection}")]
  Conflict { collection: String, id: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
