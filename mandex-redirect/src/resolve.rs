//! Choosing the best matching page for a partially specified query.

use crate::index::{primary_section, Index, IndexEntry};
use crate::language::{LanguageTag, PreferredLanguages};
use crate::parse::{parse_request, Query, RawSuffix, RedirectRequest};
use crate::{NotFoundError, RedirectError};

/// The fallback values used for fields a request leaves unspecified,
/// fixed at construction time.
#[derive(Clone, Debug)]
pub struct Defaults {
    /// The suite served when none is requested, e.g. the current stable.
    pub suite: String,

    /// The language served when neither the path nor `Accept-Language`
    /// yields a match.
    pub language: String,

    /// The section preferred when none is requested.
    pub section: String,
}

/// Resolves requests against the index.
///
/// Stateless per request; the index is immutable after construction,
/// so a single `Redirector` is shared by all request handlers.
#[derive(Clone, Debug)]
pub struct Redirector {
    /// The catalog of known pages.
    index: Index,

    /// The construction-time fallbacks.
    defaults: Defaults,
}

impl Redirector {
    /// Creates a redirector over a finished index.
    pub fn new(index: Index, defaults: Defaults) -> Self {
        Self { index, defaults }
    }

    /// The index this redirector serves from.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Resolves a request to its canonical serving path.
    ///
    /// The returned path always has the shape
    /// `/<suite>/<binarypkg>/<name>.<section>.<language>.<ext>`.
    pub fn redirect(&self, request: &RedirectRequest) -> Result<String, RedirectError> {
        let query = parse_request(&self.index, request)?;
        self.resolve(&query)
    }

    /// Fills in the unspecified fields of a parsed query and emits the
    /// serving path of the best match.
    fn resolve(&self, query: &Query) -> Result<String, RedirectError> {
        let all = match self.index.candidates(&query.name) {
            Some(entries) => entries,
            None => {
                return Err(NotFoundError {
                    manpage: query.name.clone(),
                    best_choice: None,
                }
                .into())
            }
        };

        // An unknown suite is not an error: the request falls through
        // to default suite selection below.
        let suite = query.suite.as_deref().and_then(|alias| {
            let resolved = self.index.resolve_suite(alias);
            if resolved.is_none() {
                tracing::debug!(suite = alias, "unknown suite dropped from query");
            }
            resolved
        });

        // Fully specified raw requests redirect across suites without
        // consulting the entries: they exist so that static `.gz` links
        // survive a suite alias moving to a new release.
        if query.raw_suffix == Some(RawSuffix::Gz) {
            if let (Some(suite), Some(binarypkg), Some(section), Some(language)) = (
                suite,
                query.binarypkg.as_deref(),
                query.section.as_deref(),
                query.language.as_deref(),
            ) {
                return Ok(format!(
                    "/{}/{}/{}.{}.{}.gz",
                    suite, binarypkg, query.name, section, language
                ));
            }
        }

        let mut candidates: Vec<&IndexEntry> = all.iter().collect();

        // Apply each requested constraint, dropping any that would
        // leave nothing; a dropped constraint becomes a field to fill
        // in from the defaults below.
        let suite_applied =
            suite.map_or(false, |s| retain_if_any(&mut candidates, |e| e.suite == s));
        if let Some(binarypkg) = query.binarypkg.as_deref() {
            if !retain_if_any(&mut candidates, |e| {
                e.binarypkg.eq_ignore_ascii_case(binarypkg)
            }) {
                tracing::debug!(binarypkg, "binarypkg constraint dropped");
            }
        }
        let section_applied = query.section.as_deref().map_or(false, |section| {
            retain_if_any(&mut candidates, |e| section_matches(&e.section, section))
        });
        let language_applied = query.language.as_deref().map_or(false, |language| {
            retain_if_any(&mut candidates, |e| e.language == language)
        });

        if !suite_applied {
            // Prefer the default suite; a page only shipped elsewhere
            // keeps its own suites.
            retain_if_any(&mut candidates, |e| e.suite == self.defaults.suite);
        }

        if !language_applied {
            let language = self.choose_language(&candidates, &query.preferred);
            candidates.retain(|e| e.language == language);
        }

        if section_applied {
            // An exact section match beats a subsection refinement:
            // `editline.3` serves section 3 when it exists, 3edit when
            // that is all there is.
            if let Some(section) = query.section.as_deref() {
                retain_if_any(&mut candidates, |e| e.section == section);
            }
        } else {
            let section = self.choose_section(&candidates);
            candidates.retain(|e| e.section == section);
        }

        // Whatever ambiguity remains is settled deterministically:
        // smallest binarypkg first, then the stable component order.
        candidates.sort_by(|a, b| {
            (&a.binarypkg, &a.suite, &a.section, &a.language)
                .cmp(&(&b.binarypkg, &b.suite, &b.section, &b.language))
        });

        let ext = match query.raw_suffix {
            Some(RawSuffix::Gz) => "gz",
            _ => "html",
        };

        match candidates.first() {
            Some(entry) => Ok(entry.serving_path(ext)),
            // Unreachable as long as every filter relaxes, but the
            // pre-filter front-runner makes a useful suggestion.
            None => Err(NotFoundError {
                manpage: query.name.clone(),
                best_choice: all.first().cloned(),
            }
            .into()),
        }
    }

    /// Picks the language to serve when the query did not fix one:
    /// the client's preferences in descending weight, then the default
    /// language, then the lexicographically smallest available.
    fn choose_language(&self, candidates: &[&IndexEntry], preferred: &PreferredLanguages) -> String {
        for range in &preferred.0 {
            match &range.tag {
                LanguageTag::Tag(tag) => {
                    if candidates.iter().any(|e| e.language == *tag) {
                        return tag.clone();
                    }
                }
                // Any language satisfies a wildcard; fall through to
                // the deterministic choice.
                LanguageTag::Wildcard => break,
            }
        }

        if candidates
            .iter()
            .any(|e| e.language == self.defaults.language)
        {
            return self.defaults.language.clone();
        }

        candidates
            .iter()
            .map(|e| e.language.as_str())
            .min()
            .unwrap_or(self.defaults.language.as_str())
            .to_string()
    }

    /// Picks the section to serve when the query did not fix one: the
    /// default section when available, else the numerically smallest
    /// primary section, an exact section winning over its subsections.
    fn choose_section(&self, candidates: &[&IndexEntry]) -> String {
        if candidates.iter().any(|e| e.section == self.defaults.section) {
            return self.defaults.section.clone();
        }

        candidates
            .iter()
            .map(|e| e.section.as_str())
            .min_by_key(|section| section_rank(section))
            .unwrap_or(self.defaults.section.as_str())
            .to_string()
    }
}

/// Applies `keep` unless doing so would empty the candidate set.
/// Returns whether the filter stuck.
fn retain_if_any<'a, F>(candidates: &mut Vec<&'a IndexEntry>, keep: F) -> bool
where
    F: Fn(&IndexEntry) -> bool,
{
    if candidates.iter().any(|entry| keep(entry)) {
        candidates.retain(|entry| keep(entry));
        true
    } else {
        false
    }
}

/// Whether an entry's section satisfies a requested one. Subsections
/// refine their leading-digit section: a request for `3` matches both
/// `3` and `3edit`, while `3edit` only matches itself.
fn section_matches(entry: &str, wanted: &str) -> bool {
    entry == wanted || primary_section(entry) == wanted
}

/// Sort key for sections: numeric primary first, exact sections before
/// their subsections, lexicographic order last.
fn section_rank(section: &str) -> (u32, bool, String) {
    let primary = primary_section(section);
    (
        primary.parse::<u32>().unwrap_or(u32::MAX),
        section.len() != primary.len(),
        section.to_string(),
    )
}
