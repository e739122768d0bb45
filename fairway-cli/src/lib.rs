//! Command-line interface for the Fairway course directory and scorebook.
//!
//! Every subcommand resolves its options through `ortho_config`, so each
//! value may come from a flag, a `FAIRWAY_CMDS_<COMMAND>_<FIELD>` environment
//! variable or a configuration file. Results go to stdout; logs go to stderr.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use fairway_data::SqliteStore;

mod directory;
mod error;
mod logging;
mod scores;

pub use error::CliError;

use directory::{CoursesArgs, OverpassSourceBuilder, SourceBuilder, SyncArgs};
use scores::{CardArgs, RoundsArgs, ScoreArgs, StartArgs};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_LATITUDE: &str = "latitude";
pub(crate) const ARG_LONGITUDE: &str = "longitude";
pub(crate) const ARG_RADIUS_METERS: &str = "radius-meters";
pub(crate) const ARG_TTL_HOURS: &str = "ttl-hours";
pub(crate) const ARG_OVERPASS_URL: &str = "overpass-url";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_ACCESS: &str = "access";
pub(crate) const ARG_COURSE: &str = "course";
pub(crate) const ARG_DATE: &str = "date";
pub(crate) const ARG_ROUND: &str = "round";
pub(crate) const ARG_HOLE: &str = "hole";
pub(crate) const ARG_STROKES: &str = "strokes";
pub(crate) const ENV_START_COURSE: &str = "FAIRWAY_CMDS_START_COURSE";
pub(crate) const ENV_SCORE_ROUND: &str = "FAIRWAY_CMDS_SCORE_ROUND";
pub(crate) const ENV_SCORE_HOLE: &str = "FAIRWAY_CMDS_SCORE_HOLE";
pub(crate) const ENV_SCORE_STROKES: &str = "FAIRWAY_CMDS_SCORE_STROKES";
pub(crate) const ENV_CARD_ROUND: &str = "FAIRWAY_CMDS_CARD_ROUND";

/// Database file used when none is configured.
pub const DEFAULT_DATABASE: &str = "fairway.sqlite";

/// Run the Fairway CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, storage or output
/// fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    logging::init_logging(cli.verbose)?;
    let mut stdout = std::io::stdout().lock();
    execute(cli.command, &OverpassSourceBuilder, &mut stdout)
}

fn execute(
    command: Command,
    builder: &dyn SourceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Sync(args) => directory::run_sync_with(args, builder, writer),
        Command::Courses(args) => directory::run_courses_with(args, writer),
        Command::Start(args) => scores::run_start_with(args, writer),
        Command::Score(args) => scores::run_score_with(args, writer),
        Command::Rounds(args) => scores::run_rounds_with(args, writer),
        Command::Card(args) => scores::run_card_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fairway",
    about = "Golf course directory and scorebook backed by OpenStreetMap",
    version
)]
struct Cli {
    /// Increase log output (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Refresh the course cache from OpenStreetMap when it is stale.
    Sync(SyncArgs),
    /// List cached courses.
    Courses(CoursesArgs),
    /// Start a round, optionally scoring every hole at once.
    Start(StartArgs),
    /// Record or overwrite one hole of a round.
    Score(ScoreArgs),
    /// List recorded rounds, newest first.
    Rounds(RoundsArgs),
    /// Show the holes and total of one round.
    Card(CardArgs),
}

pub(crate) fn open_store(database: Option<Utf8PathBuf>) -> Result<SqliteStore, CliError> {
    let path = database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
    SqliteStore::open(&path).map_err(|source| CliError::OpenStore { path, source })
}

#[cfg(test)]
mod tests;
