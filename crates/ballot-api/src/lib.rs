//! JSON HTTP API for Ballot.
//!
//! Exposes an axum [`Router`] backed by any [`ballot_core::store::VoteStore`].
//! CORS, tracing and transport concerns are the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Plain-text readiness line |
//! | `POST` | `/vote` | Body: [`votes::VoteBody`]; returns 201 |
//! | `GET`  | `/results` | Candidate → count object |

pub mod error;
pub mod health;
pub mod results;
pub mod votes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use ballot_core::store::VoteStore;

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be served directly or nested into any
/// parent router regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: VoteStore + 'static,
{
  Router::new()
    .route("/", get(health::handler))
    .route("/vote", post(votes::create::<S>))
    .route("/results", get(results::handler::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
