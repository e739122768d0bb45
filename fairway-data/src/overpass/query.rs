//! Overpass QL text for radius searches.

use fairway_core::RadiusQuery;

/// Build the Overpass QL query selecting golf courses within `query`.
///
/// Nodes, ways and relations are selected; `out center tags` asks the server
/// to compute a centre for non-point geometry.
///
/// # Examples
/// ```
/// use fairway_core::RadiusQuery;
/// use fairway_data::overpass::build_query;
/// use geo::Coord;
///
/// let query = RadiusQuery::new(Coord { x: -75.1652, y: 39.9526 }, 48_280)?;
/// let text = build_query(&query, 25);
/// assert!(text.contains(r#"nwr["leisure"="golf_course"](around:48280,39.9526,-75.1652);"#));
/// # Ok::<(), fairway_core::ValidationError>(())
/// ```
#[must_use]
pub fn build_query(query: &RadiusQuery, query_timeout_secs: u32) -> String {
    let center = query.center();
    format!(
        "[out:json][timeout:{timeout}];\n(\n  nwr[\"leisure\"=\"golf_course\"](around:{radius},{lat},{lon});\n);\nout center tags;",
        timeout = query_timeout_secs.max(1),
        radius = query.radius_meters(),
        lat = center.y,
        lon = center.x,
    )
}
