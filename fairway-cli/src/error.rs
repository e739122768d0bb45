//! Error types emitted by the Fairway CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fairway_core::{
    DirectoryError, ParseAccessLabelError, RoundId, ScoringError, StorageError, ValidationError,
};
use fairway_data::{OverpassBuildError, SqliteStoreError};
use thiserror::Error;

/// Errors emitted by the Fairway CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A date option was not `YYYY-MM-DD`.
    #[error("invalid {field} {value:?}: expected YYYY-MM-DD")]
    InvalidDate {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stroke list entry was not a whole number.
    #[error("invalid {field} entry {value:?}: {source}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    /// An access filter named an unknown label.
    #[error(transparent)]
    InvalidAccess(#[from] ParseAccessLabelError),
    /// The search centre or radius is out of range.
    #[error("invalid search area: {0}")]
    InvalidSearchArea(#[source] ValidationError),
    /// A configured duration does not fit the clock.
    #[error("{field} of {value} is too large")]
    DurationOverflow { field: &'static str, value: u64 },
    /// Installing the logger failed.
    #[error("failed to initialise logging: {0}")]
    Logging(#[from] log::SetLoggerError),
    /// Opening the SQLite database failed.
    #[error("failed to open database at {path:?}: {source}")]
    OpenStore {
        path: Utf8PathBuf,
        #[source]
        source: SqliteStoreError,
    },
    /// Constructing the Overpass client failed.
    #[error("failed to build Overpass client for {endpoint:?}: {source}")]
    BuildSource {
        endpoint: String,
        #[source]
        source: OverpassBuildError,
    },
    /// Refreshing the course directory failed in storage.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    /// Reading from the store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Recording a round or hole failed.
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    /// The requested round does not exist.
    #[error("round {round_id} does not exist")]
    RoundNotFound { round_id: RoundId },
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[from] std::io::Error),
}
