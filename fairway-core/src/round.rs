//! Played rounds.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::CourseId;

/// Local key of a recorded round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundId(pub i64);

impl RoundId {
    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Input for creating a round.
///
/// Blank `tees` and `notes` are dropped on construction.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use fairway_core::{CourseId, NewRound};
///
/// let played_on = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
/// let round = NewRound::new(CourseId(3), played_on).with_tees(Some("  ")).with_notes(Some("windy"));
/// assert_eq!(round.tees, None);
/// assert_eq!(round.notes.as_deref(), Some("windy"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRound {
    /// Course played.
    pub course_id: CourseId,
    /// Calendar date of play.
    pub played_on: NaiveDate,
    /// Tee set, if given.
    pub tees: Option<String>,
    /// Notes, if given.
    pub notes: Option<String>,
}

impl NewRound {
    /// Round with no tees or notes.
    #[must_use]
    pub const fn new(course_id: CourseId, played_on: NaiveDate) -> Self {
        Self {
            course_id,
            played_on,
            tees: None,
            notes: None,
        }
    }

    /// Set the tee set; blank input clears it.
    #[must_use]
    pub fn with_tees(mut self, tees: Option<&str>) -> Self {
        self.tees = non_blank(tees);
        self
    }

    /// Set the notes; blank input clears them.
    #[must_use]
    pub fn with_notes(mut self, notes: Option<&str>) -> Self {
        self.notes = non_blank(notes);
        self
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// A stored round joined with its course name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    /// Local key.
    pub id: RoundId,
    /// Calendar date of play.
    pub played_on: NaiveDate,
    /// Course played.
    pub course_id: CourseId,
    /// Name of the course at read time.
    pub course_name: String,
    /// Tee set.
    pub tees: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("   "), None)]
    #[case(Some(" Blue "), Some("Blue"))]
    fn normalises_tees(#[case] raw: Option<&str>, #[case] expected: Option<&str>) {
        let played_on = NaiveDate::from_ymd_opt(2024, 4, 20).expect("valid date");
        let round = NewRound::new(CourseId(1), played_on).with_tees(raw);
        assert_eq!(round.tees.as_deref(), expected);
    }
}
