//! In-memory fakes for unit and behaviour tests.
//!
//! Available under `cfg(test)` and the `test-support` feature.

use std::{
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::{
    AccessFilter, Course, CourseId, CourseSource, CourseStore, CourseUpsert, Hole, HoleEntry,
    NetworkError, NewRound, RadiusQuery, RawElement, ReferentialError, Round, RoundId,
    ScoreStore, ScoringError, SourceRef, StorageError, store::sort_courses,
};

#[derive(Debug, Default)]
struct MemoryState {
    courses: Vec<Course>,
    rounds: Vec<(RoundId, NewRound, DateTime<Utc>)>,
    holes: Vec<Hole>,
    next_course_id: i64,
    next_round_id: i64,
    course_writes: usize,
}

/// `CourseStore` and `ScoreStore` backed by vectors behind a mutex.
///
/// Linear scans only; intended for small fixtures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_course_writes_after: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MemoryStoreFault(&'static str);

impl MemoryStore {
    /// Fail every course upsert after the first `writes` succeed.
    #[must_use]
    pub fn fail_course_writes_after(mut self, writes: usize) -> Self {
        self.fail_course_writes_after = Some(writes);
        self
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state.lock().map_err(|_: PoisonError<_>| {
            StorageError::new(operation, MemoryStoreFault("memory store lock poisoned"))
        })
    }

    fn round_view(state: &MemoryState, id: RoundId, round: &NewRound, at: DateTime<Utc>) -> Round {
        let course_name = state
            .courses
            .iter()
            .find(|course| course.id == round.course_id)
            .map(|course| course.name.clone())
            .unwrap_or_default();
        Round {
            id,
            played_on: round.played_on,
            course_id: round.course_id,
            course_name,
            tees: round.tees.clone(),
            notes: round.notes.clone(),
            created_at: at,
        }
    }
}

impl CourseStore for MemoryStore {
    fn last_refreshed(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        let state = self.lock("last_refreshed")?;
        Ok(state.courses.iter().map(|course| course.updated_at).max())
    }

    fn upsert_course(
        &self,
        course: &CourseUpsert,
        updated_at: DateTime<Utc>,
    ) -> Result<CourseId, StorageError> {
        let mut state = self.lock("upsert_course")?;
        if self
            .fail_course_writes_after
            .is_some_and(|limit| state.course_writes >= limit)
        {
            return Err(StorageError::new(
                "upsert_course",
                MemoryStoreFault("injected course write failure"),
            ));
        }
        state.course_writes += 1;
        if let Some(existing) = state
            .courses
            .iter_mut()
            .find(|existing| existing.source == course.source)
        {
            existing.name.clone_from(&course.name);
            existing.location = course.location;
            existing.access = course.access;
            existing.raw_tags = course.raw_tags.clone();
            existing.updated_at = updated_at;
            return Ok(existing.id);
        }
        state.next_course_id += 1;
        let id = CourseId(state.next_course_id);
        state.courses.push(Course {
            id,
            source: course.source,
            name: course.name.clone(),
            location: course.location,
            access: course.access,
            raw_tags: course.raw_tags.clone(),
            updated_at,
        });
        Ok(id)
    }

    fn list_courses(&self, filter: &AccessFilter) -> Result<Vec<Course>, StorageError> {
        let state = self.lock("list_courses")?;
        let mut courses: Vec<_> = state
            .courses
            .iter()
            .filter(|course| filter.allows(course.access))
            .cloned()
            .collect();
        sort_courses(&mut courses);
        Ok(courses)
    }

    fn find_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        let state = self.lock("find_course")?;
        Ok(state.courses.iter().find(|course| course.id == id).cloned())
    }

    fn find_course_by_source(&self, source: SourceRef) -> Result<Option<Course>, StorageError> {
        let state = self.lock("find_course_by_source")?;
        Ok(state
            .courses
            .iter()
            .find(|course| course.source == source)
            .cloned())
    }

    fn count_courses(&self) -> Result<usize, StorageError> {
        Ok(self.lock("count_courses")?.courses.len())
    }
}

impl ScoreStore for MemoryStore {
    fn insert_round(
        &self,
        round: &NewRound,
        created_at: DateTime<Utc>,
    ) -> Result<RoundId, ScoringError> {
        let mut state = self.lock("insert_round")?;
        if !state.courses.iter().any(|course| course.id == round.course_id) {
            return Err(ReferentialError::MissingCourse {
                course_id: round.course_id,
            }
            .into());
        }
        state.next_round_id += 1;
        let id = RoundId(state.next_round_id);
        state.rounds.push((id, round.clone(), created_at));
        Ok(id)
    }

    fn upsert_hole(&self, round_id: RoundId, entry: &HoleEntry) -> Result<(), ScoringError> {
        let mut state = self.lock("upsert_hole")?;
        if !state.rounds.iter().any(|(id, _, _)| *id == round_id) {
            return Err(ReferentialError::MissingRound { round_id }.into());
        }
        let hole = Hole::from_entry(round_id, entry);
        match state
            .holes
            .iter_mut()
            .find(|existing| existing.round_id == round_id && existing.hole_number == hole.hole_number)
        {
            Some(existing) => *existing = hole,
            None => state.holes.push(hole),
        }
        Ok(())
    }

    fn list_rounds(&self) -> Result<Vec<Round>, StorageError> {
        let state = self.lock("list_rounds")?;
        let mut rounds: Vec<_> = state
            .rounds
            .iter()
            .map(|(id, round, at)| Self::round_view(&state, *id, round, *at))
            .collect();
        rounds.sort_by(|left, right| {
            right
                .played_on
                .cmp(&left.played_on)
                .then(right.id.cmp(&left.id))
        });
        Ok(rounds)
    }

    fn find_round(&self, id: RoundId) -> Result<Option<Round>, StorageError> {
        let state = self.lock("find_round")?;
        Ok(state
            .rounds
            .iter()
            .find(|(round_id, _, _)| *round_id == id)
            .map(|(round_id, round, at)| Self::round_view(&state, *round_id, round, *at)))
    }

    fn list_holes(&self, round_id: RoundId) -> Result<Vec<Hole>, StorageError> {
        let state = self.lock("list_holes")?;
        let mut holes: Vec<_> = state
            .holes
            .iter()
            .filter(|hole| hole.round_id == round_id)
            .cloned()
            .collect();
        holes.sort_by_key(|hole| hole.hole_number);
        Ok(holes)
    }
}

#[derive(Debug)]
struct StubState {
    response: Mutex<Result<Vec<RawElement>, NetworkError>>,
    calls: AtomicUsize,
}

/// `CourseSource` returning a canned response and counting calls.
///
/// Clones share the response and the counter.
///
/// # Examples
/// ```
/// use fairway_core::test_support::StubCourseSource;
/// use fairway_core::{CourseSource, RadiusQuery};
/// use geo::Coord;
///
/// let source = StubCourseSource::with_elements(Vec::new());
/// let query = RadiusQuery::new(Coord { x: 0.0, y: 0.0 }, 100).expect("valid query");
/// assert!(source.fetch(&query).expect("canned response").is_empty());
/// assert_eq!(source.call_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StubCourseSource {
    state: Arc<StubState>,
}

impl StubCourseSource {
    /// Source answering with `elements`.
    #[must_use]
    pub fn with_elements(elements: Vec<RawElement>) -> Self {
        Self::with_response(Ok(elements))
    }

    /// Source failing with `error`.
    #[must_use]
    pub fn with_error(error: NetworkError) -> Self {
        Self::with_response(Err(error))
    }

    fn with_response(response: Result<Vec<RawElement>, NetworkError>) -> Self {
        Self {
            state: Arc::new(StubState {
                response: Mutex::new(response),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Answer later calls with `elements`.
    pub fn replace_elements(&self, elements: Vec<RawElement>) {
        *self.response() = Ok(elements);
    }

    /// Fail later calls with `error`.
    pub fn fail_with(&self, error: NetworkError) {
        *self.response() = Err(error);
    }

    /// Number of `fetch` calls so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    fn response(&self) -> MutexGuard<'_, Result<Vec<RawElement>, NetworkError>> {
        self.state
            .response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl CourseSource for StubCourseSource {
    fn fetch(&self, _query: &RadiusQuery) -> Result<Vec<RawElement>, NetworkError> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.response().clone()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    ///
    /// # Panics
    /// Panics if `delta` does not fit in a [`TimeDelta`].
    pub fn advance(&self, delta: Duration) {
        let delta = TimeDelta::from_std(delta).expect("duration fits in TimeDelta");
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}
