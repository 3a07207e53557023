//! Slug handling for content files and navigation hrefs.
//!
//! Content files follow the same optional `NNN-` ordering prefix as every
//! other entry in the content directory. The number controls listing order;
//! the rest of the stem is the record's slug:
//!
//! - `010-acne-breakouts.toml` → order 10, slug `acne-breakouts`
//! - `chemical-peels.toml` → unordered, slug `chemical-peels`
//!
//! Navigation hrefs are matched to records by their final path segment, so
//! `/treatments/laser-hair-reduction/underarm-hair-reduction` resolves through
//! [`slug_from_href`] to `underarm-hair-reduction`.

/// Result of parsing a content file stem like `010-acne-breakouts`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Number prefix if present (e.g., `10` from `010-acne-breakouts`)
    pub number: Option<u32>,
    /// Slug part after `NNN-`. For unnumbered stems, this is the full input.
    pub slug: String,
}

impl ParsedName {
    /// Sort key placing numbered entries first (by number), then unnumbered.
    pub fn sort_key(&self) -> u32 {
        self.number.unwrap_or(u32::MAX)
    }
}

/// Parse a file stem following the `NNN-slug` convention.
///
/// - `"010-acne-breakouts"` → number=Some(10), slug="acne-breakouts"
/// - `"hydrafacial"` → number=None, slug="hydrafacial"
/// - `"2-in-1-peel"` → number=Some(2), slug="in-1-peel"
pub fn parse_entry_name(name: &str) -> ParsedName {
    if let Some((prefix, rest)) = name.split_once('-')
        && !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_digit())
        && let Ok(num) = prefix.parse::<u32>()
    {
        return ParsedName {
            number: Some(num),
            slug: rest.to_string(),
        };
    }
    ParsedName {
        number: None,
        slug: name.to_string(),
    }
}

/// Whether `slug` is a non-empty, URL-safe identifier: lowercase ASCII
/// letters, digits, and single inner dashes.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Extract the canonical slug from a navigation href: the final non-empty
/// path segment, ignoring any query string or fragment.
///
/// Returns `None` for hrefs with no path segment (`"/"`, `""`).
pub fn slug_from_href(href: &str) -> Option<&str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.split('/').rev().find(|segment| !segment.is_empty())
}

/// Split a href into its non-empty path segments.
pub fn href_segments(href: &str) -> Vec<&str> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.split('/').filter(|s| !s.is_empty()).collect()
}
