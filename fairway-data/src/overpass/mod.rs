//! Overpass API client for golf course lookups.
//!
//! [`OverpassClient`] implements [`fairway_core::CourseSource`]. It sends one
//! form-encoded POST per query and decodes the JSON body into
//! [`fairway_core::RawElement`]s. The synchronous trait is bridged to async
//! `reqwest` by blocking on a Tokio runtime owned by the client.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use fairway_core::{CourseSource, RadiusQuery};
//! use fairway_data::overpass::{OverpassClient, OverpassConfig};
//! use geo::Coord;
//!
//! let config = OverpassConfig::default().with_timeout(Duration::from_secs(30));
//! let client = OverpassClient::with_config(config)?;
//! let query = RadiusQuery::new(Coord { x: -75.1652, y: 39.9526 }, 48_280)?;
//! let elements = client.fetch(&query)?;
//! println!("{} elements", elements.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod dto;
mod query;

pub use client::{
    DEFAULT_ENDPOINT, DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    OverpassBuildError, OverpassClient, OverpassConfig,
};
pub use query::build_query;
