//! Input validation errors shared by the directory and the scorebook.

use thiserror::Error;

/// A value failed a range or domain check at a write boundary.
///
/// Values are rejected, never clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Hole number outside `1..=18`.
    #[error("hole number {value} is out of range (expected 1 to 18)")]
    HoleNumber {
        /// Rejected value.
        value: u32,
    },
    /// Strokes outside `1..=25`.
    #[error("strokes {value} is out of range (expected 1 to 25)")]
    Strokes {
        /// Rejected value.
        value: u32,
    },
    /// Latitude not finite or outside `-90..=90`.
    #[error("latitude {value} is out of range (expected -90 to 90)")]
    Latitude {
        /// Rejected value.
        value: f64,
    },
    /// Longitude not finite or outside `-180..=180`.
    #[error("longitude {value} is out of range (expected -180 to 180)")]
    Longitude {
        /// Rejected value.
        value: f64,
    },
    /// Search radius was zero.
    #[error("search radius must be greater than zero metres")]
    Radius,
}
