//! SQLite persistence for the course cache and the scorebook.
//!
//! [`SqliteStore`] implements both [`fairway_core::CourseStore`] and
//! [`fairway_core::ScoreStore`] over one connection. The module is split into
//! focused submodules:
//! - [`schema`] materialises the tables and records the schema version.
//! - `courses` and `scores` implement the two storage ports.
//!
//! Timestamps are stored as RFC 3339 strings with second precision and a `Z`
//! suffix, dates as `YYYY-MM-DD`, and raw tags as a JSON object.

mod courses;
mod schema;
mod scores;

use std::sync::{Mutex, MutexGuard};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use fairway_core::StorageError;
use log::debug;
use rusqlite::{Connection, Error as SqliteError, types::Type};
use thiserror::Error;

pub use schema::{SCHEMA_VERSION, initialise_schema};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised when opening a [`SqliteStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Enabling SQLite foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A schema step failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        /// Name of the failing step.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The database carries a schema version this build does not understand.
    #[error(
        "expected Fairway schema version {expected} but found {found}; apply migrations before retrying"
    )]
    VersionMismatch {
        /// Version this build writes.
        expected: i64,
        /// Version found in the database.
        found: i64,
    },
}

#[derive(Debug, Error)]
#[error("SQLite connection lock poisoned")]
struct PoisonedConnection;

/// Course, round and hole store backed by one SQLite connection.
///
/// # Examples
/// ```
/// use fairway_core::{AccessFilter, CourseStore};
/// use fairway_data::sqlite::SqliteStore;
///
/// let store = SqliteStore::open_in_memory()?;
/// assert_eq!(store.count_courses()?, 0);
/// assert!(store.list_courses(&AccessFilter::all())?.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at `path`, creating parent directories
    /// and initialising the schema.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the directory, the connection or the
    /// schema cannot be prepared.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(path)?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| SqliteStoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("opened SQLite store at {path}");
        Self::from_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| SqliteStoreError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::from_connection(connection)
    }

    fn from_connection(mut connection: Connection) -> Result<Self, SqliteStoreError> {
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.connection
            .lock()
            .map_err(|_| StorageError::new(operation, PoisonedConnection))
    }
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = base_dir_and_relative(parent)?;
    base_dir
        .create_dir_all(&relative)
        .map_err(|source| SqliteStoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })
}

fn base_dir_and_relative(
    parent: &Utf8Path,
) -> Result<(fs_utf8::Dir, Utf8PathBuf), SqliteStoreError> {
    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };

    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(|source| {
        SqliteStoreError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        }
    })?;

    Ok((dir, relative.to_path_buf()))
}

fn storage_error(operation: &'static str) -> impl FnOnce(SqliteError) -> StorageError {
    move |source| StorageError::new(operation, source)
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(column: usize, raw: &str) -> Result<DateTime<Utc>, SqliteError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|err| SqliteError::FromSqlConversionFailure(column, Type::Text, Box::new(err)))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(column: usize, raw: &str) -> Result<NaiveDate, SqliteError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|err| SqliteError::FromSqlConversionFailure(column, Type::Text, Box::new(err)))
}
