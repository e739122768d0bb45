//! Per-hole scores.
//!
//! [`HoleScore`] is raw input as typed by a user. Converting it into a
//! [`HoleEntry`] validates ranges and normalises the optional fields: zero
//! putts or penalties and blank comments are stored as absent.

use crate::{RoundId, ValidationError};

/// Validated hole number in `1..=18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HoleNumber(u8);

impl HoleNumber {
    /// Lowest hole number.
    pub const MIN: u32 = 1;
    /// Highest hole number.
    pub const MAX: u32 = 18;

    /// Validate a hole number.
    ///
    /// # Errors
    /// Returns [`ValidationError::HoleNumber`] outside `1..=18`.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::HoleNumber { value });
        }
        u8::try_from(value)
            .map(Self)
            .map_err(|_| ValidationError::HoleNumber { value })
    }

    /// Raw value.
    #[must_use]
    pub fn get(self) -> u32 {
        u32::from(self.0)
    }
}

/// Validated stroke count in `1..=25`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Strokes(u8);

impl Strokes {
    /// Fewest strokes accepted.
    pub const MIN: u32 = 1;
    /// Most strokes accepted.
    pub const MAX: u32 = 25;

    /// Validate a stroke count.
    ///
    /// # Errors
    /// Returns [`ValidationError::Strokes`] outside `1..=25`.
    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::Strokes { value });
        }
        u8::try_from(value)
            .map(Self)
            .map_err(|_| ValidationError::Strokes { value })
    }

    /// Raw value.
    #[must_use]
    pub fn get(self) -> u32 {
        u32::from(self.0)
    }
}

/// Unvalidated score for one hole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoleScore {
    /// Hole number as entered.
    pub hole_number: u32,
    /// Strokes as entered.
    pub strokes: u32,
    /// Putts, if tracked.
    pub putts: Option<u32>,
    /// Penalty strokes, if tracked.
    pub penalties: Option<u32>,
    /// Free-text comment.
    pub comment: Option<String>,
}

impl HoleScore {
    /// Score with only the required fields.
    #[must_use]
    pub const fn new(hole_number: u32, strokes: u32) -> Self {
        Self {
            hole_number,
            strokes,
            putts: None,
            penalties: None,
            comment: None,
        }
    }

    /// Set putts.
    #[must_use]
    pub const fn with_putts(mut self, putts: u32) -> Self {
        self.putts = Some(putts);
        self
    }

    /// Set penalties.
    #[must_use]
    pub const fn with_penalties(mut self, penalties: u32) -> Self {
        self.penalties = Some(penalties);
        self
    }

    /// Set a comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Validated, normalised hole write.
///
/// # Examples
/// ```
/// use fairway_core::{HoleEntry, HoleScore};
///
/// let entry = HoleEntry::try_from(HoleScore::new(5, 4).with_putts(0).with_comment("  "))?;
/// assert_eq!(entry.hole_number().get(), 5);
/// assert_eq!(entry.putts(), None);
/// assert_eq!(entry.comment(), None);
/// # Ok::<(), fairway_core::ValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoleEntry {
    hole_number: HoleNumber,
    strokes: Strokes,
    putts: Option<u32>,
    penalties: Option<u32>,
    comment: Option<String>,
}

impl HoleEntry {
    /// Hole number.
    #[must_use]
    pub const fn hole_number(&self) -> HoleNumber {
        self.hole_number
    }

    /// Stroke count.
    #[must_use]
    pub const fn strokes(&self) -> Strokes {
        self.strokes
    }

    /// Putts; `None` when untracked or zero.
    #[must_use]
    pub const fn putts(&self) -> Option<u32> {
        self.putts
    }

    /// Penalties; `None` when untracked or zero.
    #[must_use]
    pub const fn penalties(&self) -> Option<u32> {
        self.penalties
    }

    /// Trimmed comment; `None` when blank.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }
}

impl TryFrom<HoleScore> for HoleEntry {
    type Error = ValidationError;

    fn try_from(score: HoleScore) -> Result<Self, Self::Error> {
        Ok(Self {
            hole_number: HoleNumber::new(score.hole_number)?,
            strokes: Strokes::new(score.strokes)?,
            putts: score.putts.filter(|putts| *putts > 0),
            penalties: score.penalties.filter(|penalties| *penalties > 0),
            comment: score
                .comment
                .map(|comment| comment.trim().to_owned())
                .filter(|comment| !comment.is_empty()),
        })
    }
}

/// A stored hole score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hole {
    /// Owning round.
    pub round_id: RoundId,
    /// Hole number.
    pub hole_number: HoleNumber,
    /// Stroke count.
    pub strokes: Strokes,
    /// Putts, if recorded.
    pub putts: Option<u32>,
    /// Penalties, if recorded.
    pub penalties: Option<u32>,
    /// Comment, if recorded.
    pub comment: Option<String>,
}

impl Hole {
    /// Combine a round id and a validated entry.
    #[must_use]
    pub fn from_entry(round_id: RoundId, entry: &HoleEntry) -> Self {
        Self {
            round_id,
            hole_number: entry.hole_number,
            strokes: entry.strokes,
            putts: entry.putts,
            penalties: entry.penalties,
            comment: entry.comment.clone(),
        }
    }
}

/// Holes of one round, ordered by hole number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorecard {
    /// Round the holes belong to.
    pub round_id: RoundId,
    /// Holes in ascending hole-number order. May be empty.
    pub holes: Vec<Hole>,
}

impl Scorecard {
    /// Sum of strokes over the recorded holes.
    #[must_use]
    pub fn total_strokes(&self) -> u32 {
        self.holes.iter().map(|hole| hole.strokes.get()).sum()
    }

    /// Number of holes recorded so far.
    #[must_use]
    pub fn holes_played(&self) -> usize {
        self.holes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(18, true)]
    #[case(19, false)]
    fn hole_number_bounds(#[case] value: u32, #[case] valid: bool) {
        assert_eq!(HoleNumber::new(value).is_ok(), valid);
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(25, true)]
    #[case(26, false)]
    fn strokes_bounds(#[case] value: u32, #[case] valid: bool) {
        assert_eq!(Strokes::new(value).is_ok(), valid);
    }

    #[rstest]
    fn out_of_range_values_are_reported_verbatim() {
        let err = HoleEntry::try_from(HoleScore::new(5, 26)).expect_err("26 strokes");
        assert_eq!(err, ValidationError::Strokes { value: 26 });
        let err = HoleEntry::try_from(HoleScore::new(19, 4)).expect_err("hole 19");
        assert_eq!(err, ValidationError::HoleNumber { value: 19 });
    }

    #[rstest]
    fn zero_optionals_become_absent() {
        let entry = HoleEntry::try_from(HoleScore::new(1, 5).with_putts(0).with_penalties(0))
            .expect("valid score");
        assert_eq!(entry.putts(), None);
        assert_eq!(entry.penalties(), None);
    }

    #[rstest]
    fn keeps_non_zero_optionals_and_trims_comment() {
        let entry = HoleEntry::try_from(
            HoleScore::new(2, 6)
                .with_putts(2)
                .with_penalties(1)
                .with_comment(" water left "),
        )
        .expect("valid score");
        assert_eq!(entry.putts(), Some(2));
        assert_eq!(entry.penalties(), Some(1));
        assert_eq!(entry.comment(), Some("water left"));
    }

    #[rstest]
    fn totals_eighteen_holes() {
        let strokes = [4, 5, 3, 4, 5, 4, 3, 5, 4, 4, 5, 3, 4, 5, 4, 4, 3, 5];
        let holes = strokes
            .iter()
            .zip(1..)
            .map(|(strokes, number)| {
                let entry =
                    HoleEntry::try_from(HoleScore::new(number, *strokes)).expect("valid score");
                Hole::from_entry(RoundId(1), &entry)
            })
            .collect();
        let card = Scorecard {
            round_id: RoundId(1),
            holes,
        };
        assert_eq!(card.total_strokes(), 74);
        assert_eq!(card.holes_played(), 18);
    }

    #[rstest]
    fn empty_scorecard_totals_zero() {
        let card = Scorecard {
            round_id: RoundId(3),
            holes: Vec::new(),
        };
        assert_eq!(card.total_strokes(), 0);
    }
}
