//! Core domain types and services for the Fairway course directory and
//! scorebook.
//!
//! Responsibilities:
//! - Model cached golf courses, rounds and per-hole scores.
//! - Classify free-form access tagging into a closed set of labels.
//! - Decide when the course cache is stale and merge fresh results.
//! - Validate and record scores through an injected storage port.
//!
//! Boundaries:
//! - No I/O lives here. Network access and persistence are reached through the
//!   [`CourseSource`], [`CourseStore`] and [`ScoreStore`] traits, implemented
//!   by `fairway-data`.
//!
//! Invariants:
//! - At most one cached course per [`SourceRef`].
//! - Hole numbers stay within `1..=18` and strokes within `1..=25`.
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod access;
pub mod course;
pub mod directory;
pub mod error;
pub mod hole;
pub mod round;
pub mod scorebook;
pub mod source;
pub mod store;
pub mod tags;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use access::{
    AccessFilter, AccessLabel, AccessNormalizer, AccessRule, ParseAccessLabelError,
    normalize_access,
};
pub use course::{Course, CourseId, CourseUpsert, ParseSourceKindError, SourceKind, SourceRef};
pub use directory::{
    CourseDirectory, DEFAULT_CACHE_TTL, DirectoryError, MergeReport, RefreshStatus,
};
pub use error::ValidationError;
pub use hole::{Hole, HoleEntry, HoleNumber, HoleScore, Scorecard, Strokes};
pub use round::{NewRound, Round, RoundId};
pub use scorebook::{Scorebook, ScoringError};
pub use source::{CourseSource, NetworkError, RadiusQuery, RawElement};
pub use store::{CourseStore, ReferentialError, ScoreStore, StorageError};
pub use tags::Tags;
