//! Parsing and ordering of `Accept-Language` preferences.

/// A single language range from an `Accept-Language` header.
#[derive(Clone, Debug, PartialEq)]
pub struct LanguageRange {
    /// The language tag this range names, or the wildcard.
    pub tag: LanguageTag,

    /// The quality weight, if the range carried one. Absent weights
    /// count as 1.0.
    pub weight: Option<f64>,
}

impl LanguageRange {
    /// The effective quality weight of this range.
    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }
}

/// A language tag as it appears in an `Accept-Language` range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LanguageTag {
    /// A concrete tag, lowercased, region suffix and all (`fr-ch`).
    Tag(String),

    /// The `*` wildcard, which matches any language.
    Wildcard,
}

/// The ordered language preferences of a request.
///
/// Ranges are sorted by descending quality weight, stable on ties, so
/// walking the list front to back visits languages in the order the
/// client prefers them. An absent or empty header yields an empty list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PreferredLanguages(pub Vec<LanguageRange>);

impl PreferredLanguages {
    /// Parses an `Accept-Language` header value.
    ///
    /// List items that do not parse (bad quality values, non-token
    /// garbage) are skipped rather than failing the request: a broken
    /// header must not make an otherwise resolvable URL unresolvable.
    pub fn parse(header: &str) -> Self {
        let mut ranges: Vec<LanguageRange> = header
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .filter_map(|item| match parse_range(item) {
                Some(range) => Some(range),
                None => {
                    tracing::debug!(?item, "skipping malformed Accept-Language item");
                    None
                }
            })
            .collect();

        // Stable sort keeps the header order among equal weights.
        ranges.sort_by(|a, b| {
            b.effective_weight()
                .partial_cmp(&a.effective_weight())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Self(ranges)
    }

    /// Whether the client expressed no usable preference.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse one list item of the form `tag` or `tag;q=0.8`.
fn parse_range(item: &str) -> Option<LanguageRange> {
    let (tag, weight) = if let Some((tag, quality)) = item.split_once(';') {
        (tag.trim(), Some(parse_quality_value(quality)?))
    } else {
        (item, None)
    };

    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '*') {
        return None;
    }

    let tag = if tag == "*" {
        LanguageTag::Wildcard
    } else {
        LanguageTag::Tag(tag.to_ascii_lowercase())
    };

    Some(LanguageRange { tag, weight })
}

/// Parse the quality value from a string of the form q=`<quality value>`.
fn parse_quality_value(quality_value: &str) -> Option<f64> {
    let (_, weight_as_string) = quality_value.split_once('=')?;
    let weight = weight_as_string.trim().parse::<f64>().ok()?;

    if (0.0..=1.0).contains(&weight) {
        Some(weight)
    } else {
        None
    }
}
