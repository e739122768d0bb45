//! Typed tag collections copied from the geodata source.
//!
//! Tags mirror OpenStreetMap's free-form key/value structure. They are kept
//! verbatim for diagnostics and serialise as a flat JSON object.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value tags attached to a source element.
///
/// # Examples
/// ```
/// use fairway_core::Tags;
///
/// let tags = Tags::from([("name", " Cobbs Creek "), ("access", "")]);
/// assert_eq!(tags.name(), Some("Cobbs Creek"));
/// assert_eq!(tags.value("access"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Create an empty tag collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Return the trimmed value stored under `key`, ignoring blank values.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|value| !value.is_empty())
    }

    /// Return the usable `name` tag, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.value("name")
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection has no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Tags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Tags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl From<BTreeMap<String, String>> for Tags {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Cobbs Creek", Some("Cobbs Creek"))]
    #[case("  Walnut Lane  ", Some("Walnut Lane"))]
    #[case("   ", None)]
    #[case("", None)]
    fn name_ignores_blank_values(#[case] raw: &str, #[case] expected: Option<&str>) {
        let tags = Tags::from([("name", raw)]);
        assert_eq!(tags.name(), expected);
    }

    #[rstest]
    fn iterates_in_key_order() {
        let tags: Tags = [("name", "Juniata"), ("leisure", "golf_course")]
            .into_iter()
            .collect();
        let keys: Vec<_> = tags.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["leisure", "name"]);
        assert_eq!(tags.len(), 2);
    }
}
