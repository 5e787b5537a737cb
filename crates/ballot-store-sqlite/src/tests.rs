//! Integration tests for `SqliteStore` against an in-memory database.

use ballot_core::{
  store::{VoteCollection, VoteStore},
  vote::{NewVote, Vote},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn vote(voter: &str, candidate: &str) -> Vote {
  Vote::from_new(NewVote::new(voter, candidate).unwrap())
}

// ─── Collections ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn ensure_collection_is_idempotent() {
  let s = store().await;
  let first = s.ensure_collection().await.unwrap();
  let second = s.ensure_collection().await.unwrap();
  assert_eq!(first.name(), "votes");
  assert_eq!(first.name(), second.name());

  first.insert(vote("v1", "A")).await.unwrap();
  assert_eq!(second.scan_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn fresh_collection_is_empty() {
  let s = store().await;
  let c = s.ensure_collection().await.unwrap();
  assert!(c.scan_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn collections_are_isolated() {
  let s = store().await;
  let a = s.clone().with_collection("election-a").ensure_collection().await.unwrap();
  let b = s.with_collection("election-b").ensure_collection().await.unwrap();

  a.insert(vote("v1", "A")).await.unwrap();
  a.insert(vote("v2", "A")).await.unwrap();
  b.insert(vote("v1", "B")).await.unwrap();

  assert_eq!(a.scan_all().await.unwrap().len(), 2);
  assert_eq!(b.scan_all().await.unwrap().len(), 1);
}

// ─── Documents ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_scan_round_trips_fields() {
  let s = store().await;
  let c = s.ensure_collection().await.unwrap();

  let v = vote("v1", "A");
  c.insert(v.clone()).await.unwrap();

  let all = c.scan_all().await.unwrap();
  assert_eq!(all, vec![v]);
}

#[tokio::test]
async fn duplicate_id_is_a_conflict() {
  let s = store().await;
  let c = s.ensure_collection().await.unwrap();

  let v = vote("v1", "A");
  c.insert(v.clone()).await.unwrap();
  let err = c.insert(v.clone()).await.unwrap_err();
  match err {
    Error::Conflict { id, collection } => {
      assert_eq!(id, v.id);
      assert_eq!(collection, "votes");
    }
    other => panic!("expected conflict, got {other:?}"),
  }
  assert_eq!(c.scan_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn same_voter_and_candidate_twice_are_both_kept() {
  let s = store().await;
  let c = s.ensure_collection().await.unwrap();
  c.insert(vote("v1", "c1")).await.unwrap();
  c.insert(vote("v1", "c1")).await.unwrap();
  assert_eq!(c.scan_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn file_backed_store_persists_across_reopen() {
  let dir = std::env::temp_dir().join(format!(
    "ballot-sqlite-{}",
    std::process::id()
  ));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("persist.db");
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    let c = s.ensure_collection().await.unwrap();
    c.insert(vote("v1", "A")).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let c = s.ensure_collection().await.unwrap();
  assert_eq!(c.scan_all().await.unwrap().len(), 1);

  let _ = std::fs::remove_dir_all(&dir);
}
