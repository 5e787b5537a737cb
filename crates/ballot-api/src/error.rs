//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
///
/// Only `BadRequest` carries its message to the caller. Storage failures are
/// logged with their full source and answered with a fixed message.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{message}: {source}")]
  Internal {
    message: &'static str,
    #[source]
    source:  ballot_core::Error,
  },
}

impl ApiError {
  /// Map a service error, using `message` as the public text for storage
  /// failures.
  pub fn from_service(err: ballot_core::Error, message: &'static str) -> Self {
    match err {
      ballot_core::Error::Validation(m) => ApiError::BadRequest(m),
      source => ApiError::Internal { message, source },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Internal { message, source } => {
        tracing::error!(error = %source, "{message}");
        (StatusCode::INTERNAL_SERVER_ERROR, message.to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
