//! `sync` and `courses` commands.

use std::{io::Write, time::Duration};

use camino::Utf8PathBuf;
use clap::Parser;
use fairway_core::{
    AccessFilter, AccessLabel, CourseDirectory, CourseSource, CourseStore, DirectoryError,
    RadiusQuery,
};
use fairway_data::{
    OverpassClient, OverpassConfig,
    overpass::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS},
};
use geo::Coord;
use log::warn;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ACCESS, ARG_DATABASE, ARG_LATITUDE, ARG_LONGITUDE, ARG_OVERPASS_URL, ARG_RADIUS_METERS,
    ARG_TIMEOUT_SECS, ARG_TTL_HOURS, CliError, DEFAULT_DATABASE, open_store,
};

/// Default search centre latitude (Philadelphia).
pub(crate) const DEFAULT_LATITUDE: f64 = 39.9526;
/// Default search centre longitude (Philadelphia).
pub(crate) const DEFAULT_LONGITUDE: f64 = -75.1652;
/// Default search radius: thirty miles.
pub(crate) const DEFAULT_RADIUS_METERS: u32 = 48_280;
/// Default cache lifetime: one week.
pub(crate) const DEFAULT_TTL_HOURS: u64 = 168;

const SECS_PER_HOUR: u64 = 60 * 60;

/// CLI arguments for the `sync` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "sync",
    long_about = "Refresh the local course cache from the Overpass API when the \
                 newest cached course is older than the time-to-live. Use \
                 --force to refresh regardless of age.",
    about = "Refresh the course cache"
)]
#[ortho_config(prefix = "FAIRWAY")]
pub(crate) struct SyncArgs {
    /// SQLite database file.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Latitude of the search centre.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) latitude: Option<f64>,
    /// Longitude of the search centre.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) longitude: Option<f64>,
    /// Search radius in metres.
    #[arg(long = ARG_RADIUS_METERS, value_name = "meters")]
    #[serde(default)]
    pub(crate) radius_meters: Option<u32>,
    /// Maximum cache age in hours before a refresh.
    #[arg(long = ARG_TTL_HOURS, value_name = "hours")]
    #[serde(default)]
    pub(crate) ttl_hours: Option<u64>,
    /// Overpass interpreter URL.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// HTTP timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Refresh even when the cache is fresh.
    #[arg(long)]
    #[serde(default)]
    pub(crate) force: bool,
}

impl SyncArgs {
    fn into_config(self) -> Result<SyncConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SyncConfig::try_from(merged)
    }
}

/// Resolved `sync` configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SyncConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) query: RadiusQuery,
    pub(crate) ttl: Duration,
    pub(crate) overpass: OverpassConfig,
    pub(crate) force: bool,
}

impl TryFrom<SyncArgs> for SyncConfig {
    type Error = CliError;

    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        let center = Coord {
            x: args.longitude.unwrap_or(DEFAULT_LONGITUDE),
            y: args.latitude.unwrap_or(DEFAULT_LATITUDE),
        };
        let query = RadiusQuery::new(
            center,
            args.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS),
        )
        .map_err(CliError::InvalidSearchArea)?;

        let ttl_hours = args.ttl_hours.unwrap_or(DEFAULT_TTL_HOURS);
        let ttl = ttl_hours
            .checked_mul(SECS_PER_HOUR)
            .map(Duration::from_secs)
            .ok_or(CliError::DurationOverflow {
                field: ARG_TTL_HOURS,
                value: ttl_hours,
            })?;

        let overpass = OverpassConfig::new(
            args.overpass_url
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
        )
        .with_timeout(Duration::from_secs(
            args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ));

        Ok(Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            query,
            ttl,
            overpass,
            force: args.force,
        })
    }
}

/// CLI arguments for the `courses` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "courses",
    about = "List cached courses",
    long_about = "List cached courses sorted by name. Restrict the listing \
                 with a comma-separated --access list, for example \
                 --access public,unknown."
)]
#[ortho_config(prefix = "FAIRWAY")]
pub(crate) struct CoursesArgs {
    /// SQLite database file.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Comma-separated access labels to show (private, public, unknown).
    #[arg(long = ARG_ACCESS, value_name = "labels")]
    #[serde(default)]
    pub(crate) access: Option<String>,
}

impl CoursesArgs {
    fn into_config(self) -> Result<CoursesConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CoursesConfig::try_from(merged)
    }
}

/// Resolved `courses` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CoursesConfig {
    pub(crate) database: Option<Utf8PathBuf>,
    pub(crate) filter: AccessFilter,
}

impl TryFrom<CoursesArgs> for CoursesConfig {
    type Error = CliError;

    fn try_from(args: CoursesArgs) -> Result<Self, Self::Error> {
        let filter = match args.access.as_deref() {
            Some(raw) => AccessFilter::only(parse_access_list(raw)?),
            None => AccessFilter::all(),
        };
        Ok(Self {
            database: args.database,
            filter,
        })
    }
}

pub(crate) fn parse_access_list(raw: &str) -> Result<Vec<AccessLabel>, CliError> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| label.parse::<AccessLabel>().map_err(CliError::from))
        .collect()
}

/// Builds the course source for a `sync` invocation.
pub(crate) trait SourceBuilder {
    fn build(&self, config: &OverpassConfig) -> Result<Box<dyn CourseSource>, CliError>;
}

pub(crate) struct OverpassSourceBuilder;

impl SourceBuilder for OverpassSourceBuilder {
    fn build(&self, config: &OverpassConfig) -> Result<Box<dyn CourseSource>, CliError> {
        let client = OverpassClient::with_config(config.clone()).map_err(|source| {
            CliError::BuildSource {
                endpoint: config.endpoint.clone(),
                source,
            }
        })?;
        Ok(Box::new(client))
    }
}

pub(crate) fn run_sync_with(
    args: SyncArgs,
    builder: &dyn SourceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(Some(config.database.clone()))?;
    let source = builder.build(&config.overpass)?;
    let directory = CourseDirectory::new(store, source.as_ref()).with_ttl(config.ttl);

    match directory.ensure_fresh(&config.query, config.force) {
        Ok(status) => writeln!(writer, "{status}")?,
        Err(DirectoryError::Network(err)) => {
            warn!("course refresh failed: {err}");
            writeln!(
                writer,
                "Could not refresh courses from OpenStreetMap ({err}); using cached courses."
            )?;
        }
        Err(err) => return Err(err.into()),
    }

    let count = directory.store().count_courses()?;
    writeln!(writer, "{count} courses cached.")?;
    Ok(())
}

pub(crate) fn run_courses_with(args: CoursesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(config.database)?;
    let courses = store.list_courses(&config.filter)?;
    if courses.is_empty() {
        writeln!(writer, "No courses cached. Run `fairway sync` first.")?;
        return Ok(());
    }
    for course in courses {
        writeln!(writer, "{:>6}  {}", course.id, course.dropdown_label())?;
    }
    Ok(())
}
