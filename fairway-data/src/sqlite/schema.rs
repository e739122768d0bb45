//! SQLite schema for courses, rounds and holes.

use rusqlite::{Connection, OptionalExtension, Transaction};

use super::SqliteStoreError;

/// Schema version written to `fairway_schema_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Create the Fairway tables inside `connection` and record the version.
///
/// Foreign keys are enabled first. Databases already carrying a different
/// version are rejected so migrations can be applied explicitly.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use fairway_data::sqlite::initialise_schema;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create schema");
/// let version: i64 = conn
///     .query_row("SELECT version FROM fairway_schema_version", [], |row| row.get(0))
///     .expect("read schema version");
/// assert_eq!(version, 1);
/// ```
///
/// # Errors
/// Returns [`SqliteStoreError::ForeignKeys`], [`SqliteStoreError::Migration`]
/// or [`SqliteStoreError::VersionMismatch`].
pub fn initialise_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SqliteStoreError::ForeignKeys { source })?;

    let transaction = connection
        .transaction()
        .map_err(|source| SqliteStoreError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    ensure_schema_version(&transaction)?;
    create_tables(&transaction)?;
    create_indexes(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SqliteStoreError::Migration {
            step: "commit schema transaction",
            source,
        })
}

fn create_tables(transaction: &Transaction<'_>) -> Result<(), SqliteStoreError> {
    run_migration_step(
        transaction,
        "create courses",
        "CREATE TABLE IF NOT EXISTS courses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_kind TEXT NOT NULL CHECK (source_kind IN ('node', 'way', 'relation')),
            source_id INTEGER NOT NULL,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            lat REAL,
            lon REAL,
            access TEXT NOT NULL CHECK (access IN ('private', 'public', 'unknown')),
            raw_tags TEXT NOT NULL DEFAULT '{}',
            updated_at TEXT NOT NULL,
            UNIQUE (source_kind, source_id)
        )",
    )?;
    run_migration_step(
        transaction,
        "create rounds",
        "CREATE TABLE IF NOT EXISTS rounds (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            played_on TEXT NOT NULL,
            course_id INTEGER NOT NULL,
            tees TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (course_id) REFERENCES courses(id)
        )",
    )?;
    run_migration_step(
        transaction,
        "create holes",
        "CREATE TABLE IF NOT EXISTS holes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            round_id INTEGER NOT NULL,
            hole_number INTEGER NOT NULL CHECK (hole_number BETWEEN 1 AND 18),
            strokes INTEGER NOT NULL CHECK (strokes BETWEEN 1 AND 25),
            putts INTEGER CHECK (putts IS NULL OR putts >= 0),
            penalties INTEGER CHECK (penalties IS NULL OR penalties >= 0),
            comment TEXT,
            UNIQUE (round_id, hole_number),
            FOREIGN KEY (round_id) REFERENCES rounds(id) ON DELETE CASCADE
        )",
    )
}

fn create_indexes(transaction: &Transaction<'_>) -> Result<(), SqliteStoreError> {
    run_migration_step(
        transaction,
        "index courses by update time",
        "CREATE INDEX IF NOT EXISTS idx_courses_updated_at ON courses(updated_at)",
    )?;
    run_migration_step(
        transaction,
        "index rounds by play date",
        "CREATE INDEX IF NOT EXISTS idx_rounds_played_on ON rounds(played_on DESC, id DESC)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SqliteStoreError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS fairway_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row(
            "SELECT version FROM fairway_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| SqliteStoreError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SqliteStoreError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO fairway_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| SqliteStoreError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SqliteStoreError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SqliteStoreError::Migration { step, source })
}
