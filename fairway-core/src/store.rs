//! Storage ports for the course cache and the scorebook.
//!
//! The services in this crate never open connections themselves; a store is
//! injected. `fairway-data` provides a SQLite implementation and the
//! `test-support` feature an in-memory one.

use std::error::Error as StdError;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    AccessFilter, Course, CourseId, CourseUpsert, Hole, HoleEntry, NewRound, Round, RoundId,
    ScoringError, SourceRef,
};

/// Underlying persistence failure.
#[derive(Debug, Error)]
#[error("storage operation '{operation}' failed: {source}")]
pub struct StorageError {
    /// Name of the store operation that failed.
    pub operation: &'static str,
    /// Backend error.
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl StorageError {
    /// Wrap a backend error.
    pub fn new<E>(operation: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            operation,
            source: source.into(),
        }
    }
}

/// A write referenced a row that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReferentialError {
    /// No cached course has this id.
    #[error("course {course_id} does not exist")]
    MissingCourse {
        /// Requested course.
        course_id: CourseId,
    },
    /// No round has this id.
    #[error("round {round_id} does not exist")]
    MissingRound {
        /// Requested round.
        round_id: RoundId,
    },
}

/// Persistence of cached courses.
pub trait CourseStore {
    /// Most recent `updated_at` across all courses, or `None` when empty.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn last_refreshed(&self) -> Result<Option<DateTime<Utc>>, StorageError>;

    /// Insert or overwrite the course keyed by `course.source`.
    ///
    /// Each call is atomic on its own.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn upsert_course(
        &self,
        course: &CourseUpsert,
        updated_at: DateTime<Utc>,
    ) -> Result<CourseId, StorageError>;

    /// Courses admitted by `filter`, sorted case-insensitively by name then id.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn list_courses(&self, filter: &AccessFilter) -> Result<Vec<Course>, StorageError>;

    /// Look up one course by local id.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn find_course(&self, id: CourseId) -> Result<Option<Course>, StorageError>;

    /// Look up one course by external identity.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn find_course_by_source(&self, source: SourceRef) -> Result<Option<Course>, StorageError>;

    /// Number of cached courses.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn count_courses(&self) -> Result<usize, StorageError>;
}

/// Persistence of rounds and holes.
pub trait ScoreStore {
    /// Insert a round.
    ///
    /// # Errors
    /// Returns [`ScoringError::Referential`] when the course is missing and
    /// [`ScoringError::Storage`] when the backend fails.
    fn insert_round(
        &self,
        round: &NewRound,
        created_at: DateTime<Utc>,
    ) -> Result<RoundId, ScoringError>;

    /// Insert or overwrite the hole keyed by `(round_id, hole_number)`.
    ///
    /// # Errors
    /// Returns [`ScoringError::Referential`] when the round is missing and
    /// [`ScoringError::Storage`] when the backend fails.
    fn upsert_hole(&self, round_id: RoundId, entry: &HoleEntry) -> Result<(), ScoringError>;

    /// All rounds joined with course names, newest play date first, ties by
    /// descending id.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn list_rounds(&self) -> Result<Vec<Round>, StorageError>;

    /// Look up one round.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn find_round(&self, id: RoundId) -> Result<Option<Round>, StorageError>;

    /// Holes of a round in ascending hole-number order.
    ///
    /// # Errors
    /// Returns [`StorageError`] when the backend fails.
    fn list_holes(&self, round_id: RoundId) -> Result<Vec<Hole>, StorageError>;
}

impl<T> CourseStore for &T
where
    T: CourseStore + ?Sized,
{
    fn last_refreshed(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        (**self).last_refreshed()
    }

    fn upsert_course(
        &self,
        course: &CourseUpsert,
        updated_at: DateTime<Utc>,
    ) -> Result<CourseId, StorageError> {
        (**self).upsert_course(course, updated_at)
    }

    fn list_courses(&self, filter: &AccessFilter) -> Result<Vec<Course>, StorageError> {
        (**self).list_courses(filter)
    }

    fn find_course(&self, id: CourseId) -> Result<Option<Course>, StorageError> {
        (**self).find_course(id)
    }

    fn find_course_by_source(&self, source: SourceRef) -> Result<Option<Course>, StorageError> {
        (**self).find_course_by_source(source)
    }

    fn count_courses(&self) -> Result<usize, StorageError> {
        (**self).count_courses()
    }
}

impl<T> ScoreStore for &T
where
    T: ScoreStore + ?Sized,
{
    fn insert_round(
        &self,
        round: &NewRound,
        created_at: DateTime<Utc>,
    ) -> Result<RoundId, ScoringError> {
        (**self).insert_round(round, created_at)
    }

    fn upsert_hole(&self, round_id: RoundId, entry: &HoleEntry) -> Result<(), ScoringError> {
        (**self).upsert_hole(round_id, entry)
    }

    fn list_rounds(&self) -> Result<Vec<Round>, StorageError> {
        (**self).list_rounds()
    }

    fn find_round(&self, id: RoundId) -> Result<Option<Round>, StorageError> {
        (**self).find_round(id)
    }

    fn list_holes(&self, round_id: RoundId) -> Result<Vec<Hole>, StorageError> {
        (**self).list_holes(round_id)
    }
}

/// Case-insensitive name order with id as tie-break.
///
/// Shared by store implementations that sort in memory.
pub fn sort_courses(courses: &mut [Course]) {
    courses.sort_by(|left, right| {
        left.name
            .to_lowercase()
            .cmp(&right.name.to_lowercase())
            .then(left.id.cmp(&right.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessLabel, SourceKind, Tags};
    use chrono::TimeZone;
    use rstest::rstest;

    fn course(id: i64, name: &str) -> Course {
        Course {
            id: CourseId(id),
            source: SourceRef::new(SourceKind::Way, id),
            name: name.to_owned(),
            location: None,
            access: AccessLabel::Unknown,
            raw_tags: Tags::new(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[rstest]
    fn sorts_by_name_ignoring_case_then_id() {
        let mut courses = vec![
            course(3, "walnut Lane"),
            course(2, "Cobbs Creek"),
            course(1, "Walnut Lane"),
            course(4, "aronimink"),
        ];
        sort_courses(&mut courses);
        let ids: Vec<_> = courses.iter().map(|course| course.id.get()).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[rstest]
    fn storage_error_names_operation() {
        let err = StorageError::new("list_courses", "disk on fire");
        assert_eq!(
            err.to_string(),
            "storage operation 'list_courses' failed: disk on fire"
        );
    }
}
