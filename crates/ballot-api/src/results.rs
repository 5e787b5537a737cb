//! Handler for `GET /results`.

use std::sync::Arc;

use axum::{Json, extract::State};
use ballot_core::{service, store::VoteStore, tally::Tally};

use crate::error::ApiError;

/// Public text for any storage failure on this route.
pub const FETCH_FAILED: &str = "Failed to fetch results";

/// `GET /results` returns `{ "<candidateId>": <count>, ... }`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Tally>, ApiError>
where
  S: VoteStore,
{
  let tally = service::get_results(store.as_ref())
    .await
    .map_err(|e| ApiError::from_service(e, FETCH_FAILED))?;
  tracing::debug!(candidates = tally.len(), votes = tally.total(), "tallied");
  Ok(Json(tally))
}
