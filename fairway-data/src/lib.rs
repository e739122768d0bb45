//! Adapters for the Fairway course directory and scorebook.
//!
//! Responsibilities:
//! - Query the Overpass API for golf courses ([`overpass::OverpassClient`]).
//! - Persist courses, rounds and holes in SQLite ([`sqlite::SqliteStore`]).
//!
//! Boundaries:
//! - Do not encode domain rules (live in `fairway-core`).
//! - Keep blocking I/O off async executors; the HTTP client drives its own
//!   runtime or yields via `block_in_place`.
//!
//! Invariants:
//! - One HTTP request per fetch with an explicit timeout; no retries.
//! - Foreign keys are enabled on every SQLite connection.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod overpass;
pub mod sqlite;

pub use overpass::{OverpassBuildError, OverpassClient, OverpassConfig};
pub use sqlite::{SqliteStore, SqliteStoreError};
