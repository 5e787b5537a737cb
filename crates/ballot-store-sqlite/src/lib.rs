//! SQLite backend for the Ballot vote store.
//!
//! Keeps votes as JSON documents in a single table, grouped by collection,
//! so it behaves like the remote document store at a smaller scale. Wraps
//! [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{SqliteCollection, SqliteStore};

#[cfg(test)]
mod tests;
