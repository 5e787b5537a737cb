//! Core types and trait definitions for the Ballot vote service.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::VoteStore`]; the HTTP layer calls into [`service`].

pub mod error;
pub mod service;
pub mod store;
pub mod tally;
pub mod vote;

pub use error::{Error, Result};
