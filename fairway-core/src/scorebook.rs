//! Recording rounds and hole scores.
//!
//! Every hole write is its own atomic upsert keyed by `(round, hole number)`.
//! Rounds may therefore be partially scored, and re-submitting a hole
//! overwrites it.

use std::{fmt, sync::Arc};

use chrono::{NaiveDate, SubsecRound};
use log::debug;
use mockable::{Clock, DefaultClock};
use thiserror::Error;

use crate::{
    CourseId, Hole, HoleEntry, HoleScore, NewRound, ReferentialError, Round, RoundId, ScoreStore,
    Scorecard, StorageError, ValidationError,
};

/// Failure recording or reading scores.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// An input value was out of range.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A referenced course or round does not exist.
    #[error(transparent)]
    Referential(#[from] ReferentialError),
    /// The store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Round and hole service over a [`ScoreStore`].
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use fairway_core::{CourseId, HoleScore, ScoreStore, Scorebook, ScoringError};
///
/// fn score_first_hole<S: ScoreStore>(book: &Scorebook<S>) -> Result<u32, ScoringError> {
///     let played_on = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
///     let round = book.create_round(CourseId(1), played_on, Some("White"), None)?;
///     book.upsert_hole(round, HoleScore::new(1, 5))?;
///     Ok(book.scorecard(round)?.total_strokes())
/// }
/// ```
pub struct Scorebook<S> {
    store: S,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<S> Scorebook<S>
where
    S: ScoreStore,
{
    /// Scorebook stamping rounds with the system clock.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replace the clock used for `created_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Create a round. Blank `tees` and `notes` are stored as absent.
    ///
    /// # Errors
    /// Returns [`ScoringError::Referential`] when `course_id` does not exist.
    pub fn create_round(
        &self,
        course_id: CourseId,
        played_on: NaiveDate,
        tees: Option<&str>,
        notes: Option<&str>,
    ) -> Result<RoundId, ScoringError> {
        let round = NewRound::new(course_id, played_on)
            .with_tees(tees)
            .with_notes(notes);
        self.insert_round(&round)
    }

    fn insert_round(&self, round: &NewRound) -> Result<RoundId, ScoringError> {
        let created_at = self.clock.utc().trunc_subsecs(0);
        let id = self.store.insert_round(round, created_at)?;
        debug!("created round {id} on course {}", round.course_id);
        Ok(id)
    }

    /// Validate and upsert one hole.
    ///
    /// # Errors
    /// Returns [`ScoringError::Validation`] for an out-of-range hole number or
    /// stroke count and [`ScoringError::Referential`] when the round is
    /// missing.
    pub fn upsert_hole(&self, round_id: RoundId, score: HoleScore) -> Result<(), ScoringError> {
        let entry = HoleEntry::try_from(score)?;
        self.store.upsert_hole(round_id, &entry)
    }

    /// Create a round and write its holes.
    ///
    /// All scores are validated before anything is written. Holes are then
    /// upserted one at a time; a failure part way through leaves the round
    /// with the holes written so far.
    ///
    /// # Errors
    /// Returns [`ScoringError::Validation`] before any write when a score is
    /// out of range, otherwise the first store failure.
    pub fn record_round<I>(
        &self,
        round: &NewRound,
        scores: I,
    ) -> Result<(RoundId, Scorecard), ScoringError>
    where
        I: IntoIterator<Item = HoleScore>,
    {
        let entries = scores
            .into_iter()
            .map(HoleEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let round_id = self.insert_round(round)?;
        for entry in &entries {
            self.store.upsert_hole(round_id, entry)?;
        }
        let card = self.scorecard(round_id)?;
        Ok((round_id, card))
    }

    /// Every round, newest first.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the store fails.
    pub fn list_rounds(&self) -> Result<Vec<Round>, StorageError> {
        self.store.list_rounds()
    }

    /// One round.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the store fails.
    pub fn round(&self, id: RoundId) -> Result<Option<Round>, StorageError> {
        self.store.find_round(id)
    }

    /// Holes of a round by hole number. Empty for an unscored round.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the store fails.
    pub fn list_holes(&self, round_id: RoundId) -> Result<Vec<Hole>, StorageError> {
        self.store.list_holes(round_id)
    }

    /// Holes of a round with a computed total.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the store fails.
    pub fn scorecard(&self, round_id: RoundId) -> Result<Scorecard, StorageError> {
        Ok(Scorecard {
            round_id,
            holes: self.list_holes(round_id)?,
        })
    }
}

impl<S> fmt::Debug for Scorebook<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scorebook").finish_non_exhaustive()
    }
}
