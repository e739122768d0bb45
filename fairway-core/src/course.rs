//! Cached golf course records.
//!
//! A [`Course`] is keyed externally by its [`SourceRef`] and locally by a
//! [`CourseId`] surrogate that rounds reference.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;

use crate::{AccessLabel, Tags};

/// Geometry kind of a source element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    /// A single coordinate (`node` upstream).
    Point,
    /// An outlined area (`way` upstream).
    Way,
    /// A multi-part feature (`relation` upstream).
    Relation,
}

impl SourceKind {
    /// Upstream vocabulary, also used for persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised element type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element type '{value}'")]
pub struct ParseSourceKindError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for SourceKind {
    type Err = ParseSourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" | "point" => Ok(Self::Point),
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            other => Err(ParseSourceKindError {
                value: other.to_owned(),
            }),
        }
    }
}

/// External identity of a course: element kind plus upstream id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceRef {
    /// Element kind.
    pub kind: SourceKind,
    /// Upstream identifier, unique within `kind`.
    pub id: i64,
}

impl SourceRef {
    /// Construct a reference.
    #[must_use]
    pub const fn new(kind: SourceKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Local surrogate key of a cached course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CourseId(pub i64);

impl CourseId {
    /// Raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Values written for one element during a directory merge.
///
/// Every field except `source` overwrites the stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseUpsert {
    /// Merge key.
    pub source: SourceRef,
    /// Trimmed display name.
    pub name: String,
    /// Resolved location, `x` = longitude and `y` = latitude.
    pub location: Option<Coord<f64>>,
    /// Normalised access label.
    pub access: AccessLabel,
    /// Tags exactly as received.
    pub raw_tags: Tags,
}

/// A course held in the local cache.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use fairway_core::{AccessLabel, Course, CourseId, SourceKind, SourceRef, Tags};
///
/// let course = Course {
///     id: CourseId(1),
///     source: SourceRef::new(SourceKind::Way, 42),
///     name: "Cobbs Creek".into(),
///     location: None,
///     access: AccessLabel::Public,
///     raw_tags: Tags::new(),
///     updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
/// };
/// assert_eq!(course.dropdown_label(), "Cobbs Creek - Public/Playable");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    /// Local surrogate key.
    pub id: CourseId,
    /// External identity.
    pub source: SourceRef,
    /// Display name.
    pub name: String,
    /// Location if one could be resolved.
    pub location: Option<Coord<f64>>,
    /// Normalised access label.
    pub access: AccessLabel,
    /// Tags from the last merge.
    pub raw_tags: Tags,
    /// Time of the last merge that touched this course.
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Label shown when choosing a course.
    #[must_use]
    pub fn dropdown_label(&self) -> String {
        format!("{} - {}", self.name, self.access.display_label())
    }

    /// Latitude, if known.
    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.location.map(|coord| coord.y)
    }

    /// Longitude, if known.
    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.location.map(|coord| coord.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("node", SourceKind::Point)]
    #[case("point", SourceKind::Point)]
    #[case("way", SourceKind::Way)]
    #[case("relation", SourceKind::Relation)]
    fn parses_element_types(#[case] raw: &str, #[case] expected: SourceKind) {
        assert_eq!(raw.parse::<SourceKind>(), Ok(expected));
    }

    #[rstest]
    fn rejects_area_type() {
        let err = "area".parse::<SourceKind>().expect_err("area is not a source kind");
        assert_eq!(err.value, "area");
    }

    #[rstest]
    fn point_persists_with_upstream_name() {
        assert_eq!(SourceKind::Point.as_str(), "node");
        assert_eq!(
            SourceRef::new(SourceKind::Relation, 7).to_string(),
            "relation/7"
        );
    }
}
