//! Launch history store and ranking queries.
//!
//! - [`models`]: rockets, providers, launches, payloads and users.
//! - [`db`]: SQLite persistence.
//! - [`miner`]: the ranking queries, run over any [`miner::LaunchRepository`].
//! - [`seed`]: JSON bulk import.

pub mod db;
pub mod miner;
pub mod models;
pub mod seed;
