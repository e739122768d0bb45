//! Access classification for cached courses.
//!
//! Source tagging is inconsistent free text. The cache stores a closed
//! three-way [`AccessLabel`] derived by an ordered list of [`AccessRule`]s;
//! the first rule that returns a label wins and `unknown` is the fallback.
//!
//! # Examples
//! ```
//! use fairway_core::{AccessLabel, Tags, normalize_access};
//!
//! assert_eq!(normalize_access(&Tags::from([("access", "Private")])), AccessLabel::Private);
//! assert_eq!(normalize_access(&Tags::from([("membership", "required")])), AccessLabel::Private);
//! assert_eq!(normalize_access(&Tags::new()), AccessLabel::Unknown);
//! ```

use std::{collections::BTreeSet, fmt, str::FromStr};

use thiserror::Error;

use crate::Tags;

/// Canonical access classification of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessLabel {
    /// Members or invited guests only.
    Private,
    /// Open to paying visitors.
    Public,
    /// Tagging did not allow a decision.
    Unknown,
}

impl AccessLabel {
    /// Every label, in display order.
    pub const ALL: [Self; 3] = [Self::Private, Self::Public, Self::Unknown];

    /// Stable lowercase form used for storage and configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
            Self::Unknown => "unknown",
        }
    }

    /// Human-facing label for listings.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Public => "Public/Playable",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AccessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`AccessLabel`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown access label '{value}' (expected private, public or unknown)")]
pub struct ParseAccessLabelError {
    /// Rejected input.
    pub value: String,
}

impl FromStr for AccessLabel {
    type Err = ParseAccessLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "private" => Ok(Self::Private),
            "public" | "public/playable" => Ok(Self::Public),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseAccessLabelError {
                value: s.to_owned(),
            }),
        }
    }
}

/// Set of labels a listing is restricted to.
///
/// An empty filter admits every label.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessFilter {
    labels: BTreeSet<AccessLabel>,
}

impl AccessFilter {
    /// Filter admitting every label.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter admitting only the supplied labels.
    #[must_use]
    pub fn only<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = AccessLabel>,
    {
        Self {
            labels: labels.into_iter().collect(),
        }
    }

    /// Whether `label` passes the filter.
    #[must_use]
    pub fn allows(&self, label: AccessLabel) -> bool {
        self.labels.is_empty() || self.labels.contains(&label)
    }

    /// Labels admitted by the filter, in display order.
    #[must_use]
    pub fn labels(&self) -> Vec<AccessLabel> {
        AccessLabel::ALL
            .into_iter()
            .filter(|label| self.allows(*label))
            .collect()
    }
}

/// One step of the classification cascade.
///
/// Returning `None` defers to the next rule.
pub trait AccessRule: Send + Sync {
    /// Classify `tags`, or defer.
    fn classify(&self, tags: &Tags) -> Option<AccessLabel>;
}

/// Reads the `access` tag.
///
/// Restrictive values map to `private`, ambiguous values defer, and any other
/// non-empty value is treated as public access.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessTagRule;

/// `no` and `members` extend the upstream `private` value.
const PRIVATE_ACCESS_VALUES: [&str; 3] = ["private", "no", "members"];
const AMBIGUOUS_ACCESS_VALUES: [&str; 2] = ["unknown", "discouraged"];

impl AccessRule for AccessTagRule {
    fn classify(&self, tags: &Tags) -> Option<AccessLabel> {
        let access = tags.value("access")?.to_lowercase();
        if PRIVATE_ACCESS_VALUES.contains(&access.as_str()) {
            Some(AccessLabel::Private)
        } else if AMBIGUOUS_ACCESS_VALUES.contains(&access.as_str()) {
            None
        } else {
            Some(AccessLabel::Public)
        }
    }
}

/// Treats `membership=yes|required` as a private club.
#[derive(Debug, Clone, Copy, Default)]
pub struct MembershipRule;

impl AccessRule for MembershipRule {
    fn classify(&self, tags: &Tags) -> Option<AccessLabel> {
        let membership = tags.value("membership")?.to_lowercase();
        matches!(membership.as_str(), "yes" | "required").then_some(AccessLabel::Private)
    }
}

static DEFAULT_RULES: [&dyn AccessRule; 2] = [&AccessTagRule, &MembershipRule];

/// Classify `tags` with the default rule list.
#[must_use]
pub fn normalize_access(tags: &Tags) -> AccessLabel {
    classify_with(DEFAULT_RULES.iter().copied(), tags)
}

fn classify_with<'a, I>(rules: I, tags: &Tags) -> AccessLabel
where
    I: IntoIterator<Item = &'a dyn AccessRule>,
{
    rules
        .into_iter()
        .find_map(|rule| rule.classify(tags))
        .unwrap_or(AccessLabel::Unknown)
}

/// Ordered rule list used by the course directory.
///
/// # Examples
/// ```
/// use fairway_core::{AccessLabel, AccessNormalizer, AccessRule, Tags};
///
/// struct FeeRule;
///
/// impl AccessRule for FeeRule {
///     fn classify(&self, tags: &Tags) -> Option<AccessLabel> {
///         (tags.value("fee") == Some("yes")).then_some(AccessLabel::Public)
///     }
/// }
///
/// let normalizer = AccessNormalizer::default().with_rule(FeeRule);
/// assert_eq!(normalizer.normalize(&Tags::from([("fee", "yes")])), AccessLabel::Public);
/// ```
pub struct AccessNormalizer {
    rules: Vec<Box<dyn AccessRule>>,
}

impl AccessNormalizer {
    /// Build a normalizer from an explicit rule list.
    #[must_use]
    pub fn new(rules: Vec<Box<dyn AccessRule>>) -> Self {
        Self { rules }
    }

    /// Append a rule evaluated after the existing ones.
    #[must_use]
    pub fn with_rule<R>(mut self, rule: R) -> Self
    where
        R: AccessRule + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Classify `tags`, falling back to [`AccessLabel::Unknown`].
    #[must_use]
    pub fn normalize(&self, tags: &Tags) -> AccessLabel {
        classify_with(self.rules.iter().map(Box::as_ref), tags)
    }
}

impl Default for AccessNormalizer {
    fn default() -> Self {
        Self::new(vec![Box::new(AccessTagRule), Box::new(MembershipRule)])
    }
}

impl fmt::Debug for AccessNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessNormalizer")
            .field("rules", &self.rules.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[("access", "private")], AccessLabel::Private)]
    #[case(&[("access", "yes")], AccessLabel::Public)]
    #[case(&[("membership", "required")], AccessLabel::Private)]
    #[case(&[], AccessLabel::Unknown)]
    #[case(&[("access", " PRIVATE ")], AccessLabel::Private)]
    #[case(&[("access", "no")], AccessLabel::Private)]
    #[case(&[("access", "members")], AccessLabel::Private)]
    #[case(&[("access", "permissive")], AccessLabel::Public)]
    #[case(&[("access", "customers")], AccessLabel::Public)]
    #[case(&[("access", "")], AccessLabel::Unknown)]
    #[case(&[("membership", "Yes")], AccessLabel::Private)]
    #[case(&[("membership", "no")], AccessLabel::Unknown)]
    #[case(&[("access", "unknown"), ("membership", "required")], AccessLabel::Private)]
    #[case(&[("access", "discouraged")], AccessLabel::Unknown)]
    #[case(&[("access", "yes"), ("membership", "required")], AccessLabel::Public)]
    fn classifies_tags(#[case] tags: &[(&str, &str)], #[case] expected: AccessLabel) {
        let tags: Tags = tags.iter().copied().collect();
        assert_eq!(normalize_access(&tags), expected);
        assert_eq!(AccessNormalizer::default().normalize(&tags), expected);
    }

    #[rstest]
    fn empty_normalizer_falls_back_to_unknown() {
        let normalizer = AccessNormalizer::new(Vec::new());
        let tags = Tags::from([("access", "private")]);
        assert_eq!(normalizer.normalize(&tags), AccessLabel::Unknown);
    }

    #[rstest]
    #[case("private", AccessLabel::Private)]
    #[case("Public", AccessLabel::Public)]
    #[case("public/playable", AccessLabel::Public)]
    #[case(" unknown ", AccessLabel::Unknown)]
    fn parses_labels(#[case] raw: &str, #[case] expected: AccessLabel) {
        assert_eq!(raw.parse::<AccessLabel>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_label_text() {
        let err = "semi-private".parse::<AccessLabel>().expect_err("should fail");
        assert_eq!(err.value, "semi-private");
    }

    #[rstest]
    fn empty_filter_allows_everything() {
        let filter = AccessFilter::all();
        assert!(AccessLabel::ALL.into_iter().all(|label| filter.allows(label)));
    }

    #[rstest]
    fn restricted_filter_lists_labels_in_display_order() {
        let filter = AccessFilter::only([AccessLabel::Unknown, AccessLabel::Private]);
        assert!(!filter.allows(AccessLabel::Public));
        assert_eq!(
            filter.labels(),
            vec![AccessLabel::Private, AccessLabel::Unknown]
        );
    }
}
