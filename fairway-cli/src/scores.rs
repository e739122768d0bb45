//! `start`, `score`, `rounds` and `card` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use chrono::NaiveDate;
use clap::Parser;
use fairway_core::{CourseId, HoleScore, NewRound, RoundId, Scorebook, Scorecard};
use fairway_data::SqliteStore;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_COURSE, ARG_DATABASE, ARG_DATE, ARG_HOLE, ARG_ROUND, ARG_STROKES, CliError,
    ENV_CARD_ROUND, ENV_SCORE_HOLE, ENV_SCORE_ROUND, ENV_SCORE_STROKES, ENV_START_COURSE,
    open_store,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// CLI arguments for the `start` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "start",
    about = "Start a round on a cached course",
    long_about = "Create a round on a cached course. Pass --strokes with a \
                 comma-separated list to score holes 1, 2, 3 and onwards in \
                 the same step."
)]
#[ortho_config(prefix = "FAIRWAY")]
pub(crate) struct StartArgs {
    /// SQLite database file.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Local id of the course played.
    #[arg(long = ARG_COURSE, value_name = "id")]
    #[serde(default)]
    pub(crate) course: Option<i64>,
    /// Date played (YYYY-MM-DD); defaults to today.
    #[arg(long = ARG_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<String>,
    /// Tee set played.
    #[arg(long, value_name = "tees")]
    #[serde(default)]
    pub(crate) tees: Option<String>,
    /// Free-form notes.
    #[arg(long, value_name = "text")]
    #[serde(default)]
    pub(crate) notes: Option<String>,
    /// Comma-separated strokes for holes 1 onwards.
    #[arg(long = ARG_STROKES, value_name = "list")]
    #[serde(default)]
    pub(crate) strokes: Option<String>,
}

impl StartArgs {
    fn into_config(self) -> Result<StartConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        StartConfig::try_from(merged)
    }
}

/// Resolved `start` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartConfig {
    pub(crate) database: Option<Utf8PathBuf>,
    pub(crate) round: NewRound,
    pub(crate) strokes: Vec<u32>,
}

impl TryFrom<StartArgs> for StartConfig {
    type Error = CliError;

    fn try_from(args: StartArgs) -> Result<Self, Self::Error> {
        let course = args.course.ok_or(CliError::MissingArgument {
            field: ARG_COURSE,
            env: ENV_START_COURSE,
        })?;
        let played_on = match args.date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => chrono::Local::now().date_naive(),
        };
        let strokes = args
            .strokes
            .as_deref()
            .map(parse_stroke_list)
            .transpose()?
            .unwrap_or_default();
        Ok(Self {
            database: args.database,
            round: NewRound::new(CourseId(course), played_on)
                .with_tees(args.tees.as_deref())
                .with_notes(args.notes.as_deref()),
            strokes,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|source| CliError::InvalidDate {
        field: ARG_DATE,
        value: raw.to_owned(),
        source,
    })
}

pub(crate) fn parse_stroke_list(raw: &str) -> Result<Vec<u32>, CliError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse::<u32>().map_err(|source| CliError::InvalidNumber {
                field: ARG_STROKES,
                value: entry.to_owned(),
                source,
            })
        })
        .collect()
}

/// CLI arguments for the `score` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "score",
    about = "Record one hole of a round",
    long_about = "Record or overwrite one hole of a round. Re-scoring a hole \
                 replaces the earlier entry. Zero putts or penalties are \
                 stored as not recorded."
)]
#[ortho_config(prefix = "FAIRWAY")]
pub(crate) struct ScoreArgs {
    /// SQLite database file.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Round id.
    #[arg(long = ARG_ROUND, value_name = "id")]
    #[serde(default)]
    pub(crate) round: Option<i64>,
    /// Hole number (1-18).
    #[arg(long = ARG_HOLE, value_name = "number")]
    #[serde(default)]
    pub(crate) hole: Option<u32>,
    /// Strokes taken (1-25).
    #[arg(long = ARG_STROKES, value_name = "count")]
    #[serde(default)]
    pub(crate) strokes: Option<u32>,
    /// Putts taken.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) putts: Option<u32>,
    /// Penalty strokes.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) penalties: Option<u32>,
    /// Comment for the hole.
    #[arg(long, value_name = "text")]
    #[serde(default)]
    pub(crate) comment: Option<String>,
}

impl ScoreArgs {
    fn into_config(self) -> Result<ScoreConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ScoreConfig::try_from(merged)
    }
}

/// Resolved `score` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScoreConfig {
    pub(crate) database: Option<Utf8PathBuf>,
    pub(crate) round_id: RoundId,
    pub(crate) score: HoleScore,
}

impl TryFrom<ScoreArgs> for ScoreConfig {
    type Error = CliError;

    fn try_from(args: ScoreArgs) -> Result<Self, Self::Error> {
        let round = args.round.ok_or(CliError::MissingArgument {
            field: ARG_ROUND,
            env: ENV_SCORE_ROUND,
        })?;
        let hole = args.hole.ok_or(CliError::MissingArgument {
            field: ARG_HOLE,
            env: ENV_SCORE_HOLE,
        })?;
        let strokes = args.strokes.ok_or(CliError::MissingArgument {
            field: ARG_STROKES,
            env: ENV_SCORE_STROKES,
        })?;

        let mut score = HoleScore::new(hole, strokes);
        score.putts = args.putts;
        score.penalties = args.penalties;
        score.comment = args.comment;
        Ok(Self {
            database: args.database,
            round_id: RoundId(round),
            score,
        })
    }
}

/// CLI arguments for the `rounds` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "rounds", about = "List recorded rounds")]
#[ortho_config(prefix = "FAIRWAY")]
pub(crate) struct RoundsArgs {
    /// SQLite database file.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// CLI arguments for the `card` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "card", about = "Show the scorecard of a round")]
#[ortho_config(prefix = "FAIRWAY")]
pub(crate) struct CardArgs {
    /// SQLite database file.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Round id.
    #[arg(long = ARG_ROUND, value_name = "id")]
    #[serde(default)]
    pub(crate) round: Option<i64>,
}

fn open_scorebook(database: Option<Utf8PathBuf>) -> Result<Scorebook<SqliteStore>, CliError> {
    Ok(Scorebook::new(open_store(database)?))
}

pub(crate) fn run_start_with(args: StartArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let book = open_scorebook(config.database)?;
    let scores = (1..).zip(config.strokes).map(|(hole, strokes)| HoleScore::new(hole, strokes));
    let (round_id, card) = book.record_round(&config.round, scores)?;

    writeln!(
        writer,
        "Created round #{round_id} on {}.",
        config.round.played_on.format(DATE_FORMAT)
    )?;
    if card.holes_played() > 0 {
        writeln!(
            writer,
            "Saved {} holes. Total strokes: {}.",
            card.holes_played(),
            card.total_strokes()
        )?;
    }
    Ok(())
}

pub(crate) fn run_score_with(args: ScoreArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let book = open_scorebook(config.database)?;
    let (hole, strokes) = (config.score.hole_number, config.score.strokes);
    book.upsert_hole(config.round_id, config.score)?;
    writeln!(
        writer,
        "Saved hole {hole} of round #{}: {strokes} strokes.",
        config.round_id
    )?;
    Ok(())
}

pub(crate) fn run_rounds_with(args: RoundsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let book = open_scorebook(merged.database)?;
    let rounds = book.list_rounds()?;
    if rounds.is_empty() {
        writeln!(writer, "No rounds recorded yet.")?;
        return Ok(());
    }
    for round in rounds {
        writeln!(
            writer,
            "#{:<5} {}  {}  {}",
            round.id,
            round.played_on.format(DATE_FORMAT),
            round.course_name,
            round.tees.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

pub(crate) fn run_card_with(args: CardArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let round_id = merged.round.map(RoundId).ok_or(CliError::MissingArgument {
        field: ARG_ROUND,
        env: ENV_CARD_ROUND,
    })?;
    let book = open_scorebook(merged.database)?;
    let round = book
        .round(round_id)?
        .ok_or(CliError::RoundNotFound { round_id })?;

    write!(
        writer,
        "Round #{} at {} on {}",
        round.id,
        round.course_name,
        round.played_on.format(DATE_FORMAT)
    )?;
    match round.tees.as_deref() {
        Some(tees) => writeln!(writer, " ({tees} tees)")?,
        None => writeln!(writer)?,
    }
    if let Some(notes) = round.notes.as_deref() {
        writeln!(writer, "Notes: {notes}")?;
    }
    write_scorecard(writer, &book.scorecard(round_id)?)?;
    Ok(())
}

fn write_scorecard(writer: &mut dyn Write, card: &Scorecard) -> std::io::Result<()> {
    if card.holes.is_empty() {
        return writeln!(writer, "No holes recorded.");
    }
    writeln!(writer, "Hole  Strokes  Putts  Penalties  Comment")?;
    for hole in &card.holes {
        let line = format!(
            "{:>4}  {:>7}  {:>5}  {:>9}  {}",
            hole.hole_number.get(),
            hole.strokes.get(),
            optional(hole.putts),
            optional(hole.penalties),
            hole.comment.as_deref().unwrap_or("")
        );
        writeln!(writer, "{}", line.trim_end())?;
    }
    writeln!(
        writer,
        "Total strokes: {} over {} holes.",
        card.total_strokes(),
        card.holes_played()
    )
}

fn optional(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_owned(), |value| value.to_string())
}
