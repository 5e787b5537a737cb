//! [`SqliteStore`], the SQLite implementation of [`VoteStore`].

use std::path::Path;

use ballot_core::{
  store::{VoteCollection, VoteStore},
  vote::{PARTITION_KEY_PATH, Vote},
};
use chrono::Utc;

use crate::{Error, Result, schema::SCHEMA};

/// Collection name used when none is given.
pub const DEFAULT_COLLECTION: &str = "votes";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A vote store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:       tokio_rusqlite::Connection,
  collection: String,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  /// Use `name` instead of [`DEFAULT_COLLECTION`] for subsequent calls to
  /// [`VoteStore::ensure_collection`].
  pub fn with_collection(mut self, name: impl Into<String>) -> Self {
    self.collection = name.into();
    self
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self {
      conn,
      collection: DEFAULT_COLLECTION.to_owned(),
    })
  }
}

// ─── Collection handle ───────────────────────────────────────────────────────

/// Handle to one registered collection inside a [`SqliteStore`].
#[derive(Clone)]
pub struct SqliteCollection {
  conn: tokio_rusqlite::Connection,
  name: String,
}

impl SqliteCollection {
  pub fn name(&self) -> &str { &self.name }
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

impl VoteStore for SqliteStore {
  type Error = Error;
  type Collection = SqliteCollection;

  async fn ensure_collection(&self) -> Result<SqliteCollection> {
    let name = self.collection.clone();
    let created_at = Utc::now().to_rfc3339();

    let name_for_call = name.clone();
    let created = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO collections (name, partition_key, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![name_for_call, PARTITION_KEY_PATH, created_at],
        )?;
        Ok(n > 0)
      })
      .await?;

    if created {
      tracing::info!(collection = %name, "created collection");
    }

    Ok(SqliteCollection {
      conn: self.conn.clone(),
      name,
    })
  }
}

impl VoteCollection for SqliteCollection {
  type Error = Error;

  async fn insert(&self, vote: Vote) -> Result<()> {
    let body = serde_json::to_string(&vote)?;
    let collection = self.name.clone();
    let id = vote.id;
    let partition = vote.candidate_id;

    let (collection_for_call, id_for_call) = (collection.clone(), id.clone());
    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO documents (collection, id, partition_key, body_json)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![collection_for_call, id_for_call, partition, body],
        )?;
        Ok(n > 0)
      })
      .await?;

    if !inserted {
      return Err(Error::Conflict { collection, id });
    }
    Ok(())
  }

  async fn scan_all(&self) -> Result<Vec<Vote>> {
    let collection = self.name.clone();

    let bodies: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT body_json FROM documents WHERE collection = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![collection], |r| r.get(0))?
          .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(rows)
      })
      .await?;

    bodies
      .iter()
      .map(|b| serde_json::from_str(b).map_err(Error::from))
      .collect()
  }
}
