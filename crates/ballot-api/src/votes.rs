//! Handler for `POST /vote`.
//!
//! | Status | Body | When |
//! |--------|------|------|
//! | `201`  | `{"message": "..."}` | vote stored |
//! | `400`  | `{"error": "..."}` | missing, empty or malformed fields |
//! | `500`  | `{"error": "Failed to store vote"}` | storage failure |

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use ballot_core::{service, store::VoteStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Public text for any storage failure on this route.
pub const STORE_FAILED: &str = "Failed to store vote";

/// JSON body accepted by `POST /vote`.
///
/// Both fields are optional at the schema level so that an absent field
/// yields the same 400 as an empty one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
  pub voter_id:     Option<String>,
  pub candidate_id: Option<String>,
}

/// Body of a successful `POST /vote`.
#[derive(Debug, Serialize)]
pub struct Confirmation {
  pub message: String,
}

/// `POST /vote`, body: `{"voterId":"...","candidateId":"..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  payload: Result<Json<VoteBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: VoteStore,
{
  let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

  let receipt = service::record_vote(
    store.as_ref(),
    body.voter_id.unwrap_or_default(),
    body.candidate_id.unwrap_or_default(),
  )
  .await
  .map_err(|e| ApiError::from_service(e, STORE_FAILED))?;

  tracing::debug!(
    id = %receipt.vote.id,
    candidate = %receipt.vote.candidate_id,
    "vote recorded"
  );

  Ok((
    StatusCode::CREATED,
    Json(Confirmation {
      message: receipt.message.to_owned(),
    }),
  ))
}
