//! Vote and results services.
//!
//! Both are thin: every call runs `ensure_collection` and then exactly one
//! collection operation. Failures are mapped onto the storage variants of
//! [`Error`] according to the step that failed and are never retried.

use crate::{
  Error, Result,
  store::{VoteCollection, VoteStore},
  tally::Tally,
  vote::{NewVote, Vote, VoteReceipt},
};

/// Confirmation message carried by every [`VoteReceipt`].
pub const VOTE_RECORDED: &str = "Vote recorded successfully!";

/// Validate and persist a single vote.
pub async fn record_vote<S>(
  store: &S,
  voter_id: String,
  candidate_id: String,
) -> Result<VoteReceipt>
where
  S: VoteStore,
{
  let input = NewVote::new(voter_id, candidate_id)?;

  let collection = store
    .ensure_collection()
    .await
    .map_err(|e| Error::StorageUnavailable(Box::new(e)))?;

  let vote = Vote::from_new(input);
  collection
    .insert(vote.clone())
    .await
    .map_err(|e| Error::StorageWrite(Box::new(e)))?;

  Ok(VoteReceipt {
    message: VOTE_RECORDED,
    vote,
  })
}

/// Recompute the full per-candidate tally from every stored vote.
pub async fn get_results<S>(store: &S) -> Result<Tally>
where
  S: VoteStore,
{
  let collection = store
    .ensure_collection()
    .await
    .map_err(|e| Error::StorageUnavailable(Box::new(e)))?;

  let votes = collection
    .scan_all()
    .await
    .map_err(|e| Error::StorageRead(Box::new(e)))?;

  Ok(votes.iter().collect())
}
