//! The vote record, the only entity in the store.
//!
//! A vote links a voter to a candidate at a server-assigned instant. Votes are
//! immutable: nothing in this workspace updates or deletes one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Partition key path used by document stores for the vote container.
pub const PARTITION_KEY_PATH: &str = "/candidateId";

/// A persisted vote record.
///
/// Field names are camelCase on the wire. Unknown fields (store system
/// properties such as `_rid` or `_ts`) are ignored when deserialising.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
  pub id:           String,
  pub voter_id:     String,
  pub candidate_id: String,
  pub timestamp:    DateTime<Utc>,
}

impl Vote {
  /// Stamp a validated [`NewVote`] with a fresh id and the current time.
  pub fn from_new(input: NewVote) -> Self {
    Self {
      id:           Uuid::new_v4().to_string(),
      voter_id:     input.voter_id,
      candidate_id: input.candidate_id,
      timestamp:    Utc::now(),
    }
  }
}

/// A validated `(voterId, candidateId)` pair, ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVote {
  voter_id:     String,
  candidate_id: String,
}

impl NewVote {
  /// Both fields must be non-empty. No other constraint is enforced.
  pub fn new(
    voter_id: impl Into<String>,
    candidate_id: impl Into<String>,
  ) -> Result<Self> {
    let voter_id = voter_id.into();
    let candidate_id = candidate_id.into();
    if voter_id.is_empty() || candidate_id.is_empty() {
      return Err(Error::Validation(
        "Missing voterId or candidateId".to_owned(),
      ));
    }
    Ok(Self {
      voter_id,
      candidate_id,
    })
  }
}

/// Acknowledgement returned by [`record_vote`](crate::service::record_vote).
#[derive(Debug, Clone)]
pub struct VoteReceipt {
  pub message: &'static str,
  pub vote:    Vote,
}
