//! Per-candidate vote counts.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::vote::Vote;

/// Mapping of `candidateId` to the number of votes recorded for it.
///
/// Serialises as a flat JSON object. Candidates without votes are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tally(BTreeMap<String, u64>);

impl Tally {
  pub fn new() -> Self { Self::default() }

  /// Count one vote for `candidate_id`.
  pub fn record(&mut self, candidate_id: &str) {
    *self.0.entry(candidate_id.to_owned()).or_insert(0) += 1;
  }

  /// Votes recorded for `candidate_id`; zero when absent.
  pub fn get(&self, candidate_id: &str) -> u64 {
    self.0.get(candidate_id).copied().unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Number of distinct candidates with at least one vote.
  pub fn len(&self) -> usize { self.0.len() }

  /// Sum of all counts.
  pub fn total(&self) -> u64 { self.0.values().sum() }
}

impl<'a> FromIterator<&'a Vote> for Tally {
  fn from_iter<I: IntoIterator<Item = &'a Vote>>(iter: I) -> Self {
    let mut tally = Tally::new();
    for vote in iter {
      tally.record(&vote.candidate_id);
    }
    tally
  }
}
