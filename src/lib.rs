//! Facade crate for the Fairway golf course directory and scorebook.
//!
//! This crate re-exports the core domain types and services, and exposes the
//! SQLite store and Overpass client behind feature flags.

#![forbid(unsafe_code)]

pub use fairway_core::{
    AccessFilter, AccessLabel, AccessNormalizer, AccessRule, Course, CourseDirectory, CourseId,
    CourseSource, CourseStore, DEFAULT_CACHE_TTL, DirectoryError, Hole, HoleScore, NetworkError,
    NewRound, RadiusQuery, RawElement, ReferentialError, RefreshStatus, Round, RoundId,
    ScoreStore, Scorebook, Scorecard, ScoringError, SourceKind, SourceRef, StorageError, Tags,
    ValidationError, normalize_access,
};

#[cfg(feature = "store-sqlite")]
pub use fairway_data::{SqliteStore, SqliteStoreError};

#[cfg(feature = "source-overpass")]
pub use fairway_data::{OverpassBuildError, OverpassClient, OverpassConfig};
