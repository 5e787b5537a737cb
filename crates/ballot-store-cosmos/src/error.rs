//! Error type for `ballot-store-cosmos`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid master key: {0}")]
  InvalidKey(String),

  #[error("invalid endpoint: {0}")]
  Endpoint(#[from] url::ParseError),

  /// The request never produced a response (DNS, connect, TLS, timeout).
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The service answered with an unexpected status code.
  #[error("{operation} returned {status}: {body}")]
  Status {
    operation: &'static str,
    status:    StatusCode,
    body:      String,
  },

  /// The read feed handed back a continuation token it had already issued.
  #[error("read document feed repeated continuation token {0:?}")]
  RepeatedContinuation(String),

  /// A document with this id already exists in the container.
  #[error("document {0} already exists")]
  Conflict(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
