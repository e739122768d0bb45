//! Port for the upstream geodata service.
//!
//! A [`CourseSource`] answers a single bounded-radius query with raw elements.
//! Implementations issue one request with an explicit timeout and never retry;
//! the caller decides what to do with a [`NetworkError`].

use geo::Coord;
use thiserror::Error;

use crate::{SourceKind, SourceRef, Tags, ValidationError};

/// Centre and radius of a course search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    center: Coord<f64>,
    radius_meters: u32,
}

impl RadiusQuery {
    /// Validate and build a query. `center.x` is longitude, `center.y` latitude.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when a coordinate is non-finite or out of
    /// range, or when `radius_meters` is zero.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use fairway_core::{RadiusQuery, ValidationError};
    ///
    /// let query = RadiusQuery::new(Coord { x: -75.1652, y: 39.9526 }, 48_280)?;
    /// assert_eq!(query.radius_meters(), 48_280);
    /// assert!(RadiusQuery::new(Coord { x: 0.0, y: 91.0 }, 10).is_err());
    /// # Ok::<(), ValidationError>(())
    /// ```
    pub fn new(center: Coord<f64>, radius_meters: u32) -> Result<Self, ValidationError> {
        if !center.y.is_finite() || !(-90.0..=90.0).contains(&center.y) {
            return Err(ValidationError::Latitude { value: center.y });
        }
        if !center.x.is_finite() || !(-180.0..=180.0).contains(&center.x) {
            return Err(ValidationError::Longitude { value: center.x });
        }
        if radius_meters == 0 {
            return Err(ValidationError::Radius);
        }
        Ok(Self {
            center,
            radius_meters,
        })
    }

    /// Search centre.
    #[must_use]
    pub const fn center(&self) -> Coord<f64> {
        self.center
    }

    /// Search radius in metres.
    #[must_use]
    pub const fn radius_meters(&self) -> u32 {
        self.radius_meters
    }
}

/// One element as returned by the geodata service.
#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    /// Element kind.
    pub kind: SourceKind,
    /// Upstream identifier.
    pub id: i64,
    /// Direct coordinates, present for points.
    pub point: Option<Coord<f64>>,
    /// Computed centre, present for ways and relations.
    pub center: Option<Coord<f64>>,
    /// Tags, possibly empty.
    pub tags: Tags,
}

impl RawElement {
    /// Element with no coordinates.
    #[must_use]
    pub fn new(kind: SourceKind, id: i64, tags: Tags) -> Self {
        Self {
            kind,
            id,
            point: None,
            center: None,
            tags,
        }
    }

    /// Attach direct coordinates.
    #[must_use]
    pub const fn with_point(mut self, point: Coord<f64>) -> Self {
        self.point = Some(point);
        self
    }

    /// Attach a computed centre.
    #[must_use]
    pub const fn with_center(mut self, center: Coord<f64>) -> Self {
        self.center = Some(center);
        self
    }

    /// External identity of the element.
    #[must_use]
    pub const fn source_ref(&self) -> SourceRef {
        SourceRef::new(self.kind, self.id)
    }

    /// Resolve the element's location.
    ///
    /// Points use their direct coordinates and ways and relations their
    /// centre. Coordinates that are non-finite or out of range count as absent.
    #[must_use]
    pub fn location(&self) -> Option<Coord<f64>> {
        let candidate = match self.kind {
            SourceKind::Point => self.point,
            SourceKind::Way | SourceKind::Relation => self.center,
        };
        candidate.filter(is_usable_coord)
    }
}

fn is_usable_coord(coord: &Coord<f64>) -> bool {
    coord.x.is_finite()
        && coord.y.is_finite()
        && (-180.0..=180.0).contains(&coord.x)
        && (-90.0..=90.0).contains(&coord.y)
}

/// Failure talking to the geodata service.
///
/// These errors are not fatal: the cache keeps its last-known-good state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The request exceeded its timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that was called.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}: {message}")]
    Http {
        /// Endpoint that was called.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short preview of the response body.
        message: String,
    },
    /// The connection failed before a response arrived.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Endpoint that was called.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The response body was not the expected JSON.
    #[error("failed to decode geodata response: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },
}

/// Fetch golf course elements within a radius.
///
/// # Examples
/// ```
/// use fairway_core::{CourseSource, NetworkError, RadiusQuery, RawElement, SourceKind, Tags};
/// use geo::Coord;
///
/// struct Fixed;
///
/// impl CourseSource for Fixed {
///     fn fetch(&self, _query: &RadiusQuery) -> Result<Vec<RawElement>, NetworkError> {
///         Ok(vec![RawElement::new(SourceKind::Way, 1, Tags::from([("name", "Juniata")]))])
///     }
/// }
///
/// let query = RadiusQuery::new(Coord { x: -75.0, y: 40.0 }, 1_000).expect("valid query");
/// assert_eq!(Fixed.fetch(&query)?.len(), 1);
/// # Ok::<(), NetworkError>(())
/// ```
pub trait CourseSource {
    /// Issue one query and return every element in the response.
    ///
    /// # Errors
    /// Returns [`NetworkError`] for timeouts, non-success statuses, transport
    /// failures and undecodable bodies.
    fn fetch(&self, query: &RadiusQuery) -> Result<Vec<RawElement>, NetworkError>;
}

impl<T> CourseSource for &T
where
    T: CourseSource + ?Sized,
{
    fn fetch(&self, query: &RadiusQuery) -> Result<Vec<RawElement>, NetworkError> {
        (**self).fetch(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PHILADELPHIA: Coord<f64> = Coord {
        x: -75.1652,
        y: 39.9526,
    };

    #[rstest]
    #[case(Coord { x: 0.0, y: 90.5 }, 10, ValidationError::Latitude { value: 90.5 })]
    #[case(Coord { x: 180.5, y: 0.0 }, 10, ValidationError::Longitude { value: 180.5 })]
    #[case(PHILADELPHIA, 0, ValidationError::Radius)]
    fn rejects_invalid_queries(
        #[case] center: Coord<f64>,
        #[case] radius: u32,
        #[case] expected: ValidationError,
    ) {
        assert_eq!(RadiusQuery::new(center, radius), Err(expected));
    }

    #[rstest]
    fn rejects_nan_latitude() {
        let err = RadiusQuery::new(Coord { x: 0.0, y: f64::NAN }, 10)
            .expect_err("NaN latitude must fail");
        assert!(matches!(err, ValidationError::Latitude { .. }));
    }

    #[rstest]
    fn point_uses_direct_coordinates() {
        let element = RawElement::new(SourceKind::Point, 1, Tags::new())
            .with_point(PHILADELPHIA)
            .with_center(Coord { x: 0.0, y: 0.0 });
        assert_eq!(element.location(), Some(PHILADELPHIA));
    }

    #[rstest]
    #[case(SourceKind::Way)]
    #[case(SourceKind::Relation)]
    fn areas_use_centre(#[case] kind: SourceKind) {
        let element = RawElement::new(kind, 1, Tags::new()).with_center(PHILADELPHIA);
        assert_eq!(element.location(), Some(PHILADELPHIA));
    }

    #[rstest]
    fn way_without_centre_has_no_location() {
        let element = RawElement::new(SourceKind::Way, 1, Tags::new()).with_point(PHILADELPHIA);
        assert_eq!(element.location(), None);
    }

    #[rstest]
    fn non_finite_coordinates_are_absent() {
        let element = RawElement::new(SourceKind::Point, 1, Tags::new()).with_point(Coord {
            x: f64::INFINITY,
            y: 10.0,
        });
        assert_eq!(element.location(), None);
    }
}
