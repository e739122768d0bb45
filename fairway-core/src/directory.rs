//! Course directory cache.
//!
//! [`CourseDirectory`] decides whether the cached courses are stale, pulls a
//! fresh batch from a [`CourseSource`] when they are, and merges each element
//! into the [`CourseStore`] keyed by its [`SourceRef`](crate::SourceRef).
//!
//! A refresh is best effort per element: unnamed elements are skipped and a
//! storage failure part way through leaves earlier merges in place. Running
//! the refresh again is idempotent.

use std::{fmt, sync::Arc, time::Duration};

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use log::{debug, info};
use mockable::{Clock, DefaultClock};
use thiserror::Error;

use crate::{
    AccessFilter, AccessNormalizer, Course, CourseId, CourseSource, CourseStore, CourseUpsert,
    NetworkError, RadiusQuery, RawElement, StorageError,
};

/// Default maximum age of the cache: seven days.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Failure ensuring the cache is fresh.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The geodata service could not be reached or answered badly.
    #[error("failed to fetch courses: {0}")]
    Network(#[from] NetworkError),
    /// The cache could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Counts from one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Elements inserted or updated.
    pub stored: usize,
    /// Elements dropped for lacking a usable name.
    pub skipped: usize,
}

/// Outcome of [`CourseDirectory::ensure_fresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// The cache was fresh and the source was not called.
    CacheHit {
        /// Most recent merge time in the cache.
        last_refreshed: DateTime<Utc>,
    },
    /// The source was queried and its results merged.
    Refreshed {
        /// Elements inserted or updated.
        stored: usize,
        /// Elements dropped for lacking a usable name.
        skipped: usize,
        /// Timestamp written to every merged course.
        refreshed_at: DateTime<Utc>,
    },
}

impl RefreshStatus {
    /// Whether the source was called.
    #[must_use]
    pub const fn is_refresh(&self) -> bool {
        matches!(self, Self::Refreshed { .. })
    }
}

impl fmt::Display for RefreshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheHit { last_refreshed } => write!(
                f,
                "Using cached courses (last refresh: {}).",
                last_refreshed.format("%Y-%m-%d %H:%M UTC")
            ),
            Self::Refreshed { stored, .. } => write!(
                f,
                "Refreshed courses from OpenStreetMap: stored/updated {stored} items."
            ),
        }
    }
}

/// TTL-gated cache of golf courses.
///
/// Generic over the store and the source so tests can substitute in-memory
/// fakes. The clock defaults to [`DefaultClock`].
pub struct CourseDirectory<S, C> {
    store: S,
    source: C,
    clock: Arc<dyn Clock + Send + Sync>,
    ttl: Duration,
    normalizer: AccessNormalizer,
}

impl<S, C> CourseDirectory<S, C>
where
    S: CourseStore,
    C: CourseSource,
{
    /// Directory using the system clock, the default TTL and the default
    /// access rules.
    pub fn new(store: S, source: C) -> Self {
        Self {
            store,
            source,
            clock: Arc::new(DefaultClock),
            ttl: DEFAULT_CACHE_TTL,
            normalizer: AccessNormalizer::default(),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replace the access rules.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: AccessNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Configured TTL.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Refresh the cache when it is empty, stale or `force` is set.
    ///
    /// The cache is stale once `now - last_refreshed >= ttl`.
    ///
    /// # Errors
    /// Returns [`DirectoryError::Network`] when the fetch fails, leaving the
    /// cache untouched, and [`DirectoryError::Storage`] when the store fails.
    pub fn ensure_fresh(
        &self,
        query: &RadiusQuery,
        force: bool,
    ) -> Result<RefreshStatus, DirectoryError> {
        let now = self.clock.utc().trunc_subsecs(0);
        let last_refreshed = self.store.last_refreshed()?;
        if let Some(last) = last_refreshed
            && !force
            && !self.is_stale(last, now)
        {
            debug!("course cache fresh (last refresh {last})");
            return Ok(RefreshStatus::CacheHit {
                last_refreshed: last,
            });
        }

        let elements = self.source.fetch(query)?;
        let report = self.merge(elements, now)?;
        info!(
            "refreshed course cache: {} stored, {} skipped",
            report.stored, report.skipped
        );
        Ok(RefreshStatus::Refreshed {
            stored: report.stored,
            skipped: report.skipped,
            refreshed_at: now,
        })
    }

    fn is_stale(&self, last: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(last) >= ttl
    }

    /// Upsert every named element with `updated_at = at`.
    ///
    /// # Errors
    /// Returns the first [`StorageError`]; elements merged before it stay
    /// merged.
    pub fn merge<I>(&self, elements: I, at: DateTime<Utc>) -> Result<MergeReport, StorageError>
    where
        I: IntoIterator<Item = RawElement>,
    {
        let mut report = MergeReport::default();
        for element in elements {
            let Some(upsert) = self.prepare(element) else {
                report.skipped += 1;
                continue;
            };
            self.store.upsert_course(&upsert, at)?;
            report.stored += 1;
        }
        Ok(report)
    }

    fn prepare(&self, element: RawElement) -> Option<CourseUpsert> {
        let source = element.source_ref();
        let Some(name) = element.tags.name().map(str::to_owned) else {
            debug!("skipping {source}: no usable name");
            return None;
        };
        let location = element.location();
        if location.is_none() {
            debug!("{source} has no usable location");
        }
        Some(CourseUpsert {
            source,
            name,
            location,
            access: self.normalizer.normalize(&element.tags),
            raw_tags: element.tags,
        })
    }

    /// Cached courses admitted by `filter`, sorted by name.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the store fails.
    pub fn list(&self, filter: &AccessFilter) -> Result<Vec<Course>, StorageError> {
        self.store.list_courses(filter)
    }

    /// Look up one cached course.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the store fails.
    pub fn course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        self.store.find_course(id)
    }
}

impl<S, C> fmt::Debug for CourseDirectory<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourseDirectory")
            .field("ttl", &self.ttl)
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}
