//! DTOs for decoding Overpass JSON responses.
//!
//! The client decodes into these transport types first, then maps them into
//! [`RawElement`]s in one pass.

use std::collections::BTreeMap;

use fairway_core::{RawElement, SourceKind, Tags};
use geo::Coord;
use log::warn;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    #[serde(rename = "type")]
    pub(super) element_type: String,
    pub(super) id: i64,
    pub(super) lon: Option<f64>,
    pub(super) lat: Option<f64>,
    pub(super) center: Option<OverpassCenterDto>,
    #[serde(default)]
    pub(super) tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassCenterDto {
    pub(super) lon: f64,
    pub(super) lat: f64,
}

impl OverpassResponseDto {
    /// Map every element with a recognised type; others are logged and
    /// dropped.
    pub(super) fn into_raw_elements(self) -> Vec<RawElement> {
        self.elements
            .into_iter()
            .filter_map(OverpassElementDto::into_raw_element)
            .collect()
    }
}

impl OverpassElementDto {
    fn into_raw_element(self) -> Option<RawElement> {
        let kind = match self.element_type.parse::<SourceKind>() {
            Ok(kind) => kind,
            Err(err) => {
                warn!("skipping Overpass element {}: {err}", self.id);
                return None;
            }
        };
        let point = match (self.lon, self.lat) {
            (Some(x), Some(y)) => Some(Coord { x, y }),
            _ => None,
        };
        Some(RawElement {
            kind,
            id: self.id,
            point,
            center: self.center.map(|center| Coord {
                x: center.lon,
                y: center.lat,
            }),
            tags: Tags::from(self.tags),
        })
    }
}
