//! Azure Cosmos DB (SQL API) backend for the Ballot vote store.
//!
//! Talks to the Cosmos DB REST API directly with [`reqwest`], signing every
//! request with the account master key. Only the handful of operations the
//! vote service needs are implemented: create database, create container,
//! create document and read the document feed.

mod auth;
mod client;

pub mod error;

pub use client::{CosmosCollection, CosmosConfig, CosmosStore};
pub use error::{Error, Result};
