//! Turning raw request paths into partially specified queries.
//!
//! The archive has accumulated several URL dialects over the years:
//! the native `[<suite>/][<binarypkg>/]<name>[.<section>][.<language>]`
//! form, the legacy manpages.debian.org forms (`man/<lang>/<name>`,
//! `man5/<name>`, `5/<name>`, ...), the FreeBSD `name/section` form,
//! and names typed with blanks instead of dashes or underscores. The
//! parser decides which dialect applies by consulting the index, so
//! that whichever reading actually names a known page wins.

use crate::index::Index;
use crate::language::PreferredLanguages;
use crate::RedirectError;

/// The raw ingredients of a redirect request, as handed over by the
/// HTTP layer: the percent-decoded URL path, the query parameters in
/// request order, and the unparsed `Accept-Language` header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RedirectRequest {
    /// The percent-decoded URL path, including the leading slash.
    pub path: String,

    /// The query parameters, as decoded key/value pairs.
    pub query: Vec<(String, String)>,

    /// The `Accept-Language` header value, if the request carried one.
    pub accept_language: Option<String>,
}

/// The recognized trailing extension of a request path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawSuffix {
    /// A `.html` suffix: the default rendered page.
    Html,

    /// A `.gz` suffix: the raw manpage source. Fully specified `.gz`
    /// requests redirect without consulting the entry tables.
    Gz,
}

/// A partially specified manpage request, the output of URL parsing.
/// Unset fields mean the user did not say; the resolver fills them in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    /// The requested suite name or alias, verbatim.
    pub suite: Option<String>,

    /// The requested binary package.
    pub binarypkg: Option<String>,

    /// The manpage name token, as typed. Lookups against the index are
    /// case-insensitive; this keeps the user's casing for error pages.
    pub name: String,

    /// The requested section, lowercased.
    pub section: Option<String>,

    /// The requested language, lowercased.
    pub language: Option<String>,

    /// The ordered `Accept-Language` preferences of the request.
    pub preferred: PreferredLanguages,

    /// The trailing extension, if the path carried one.
    pub raw_suffix: Option<RawSuffix>,
}

/// How the path segments map onto query fields, before the name token
/// itself is taken apart.
#[derive(Clone, Copy, Debug, Default)]
struct RoutedPath<'a> {
    /// The segment routed as a suite, if any.
    suite: Option<&'a str>,
    /// The segment routed as a binary package, if any.
    binarypkg: Option<&'a str>,
    /// A section fixed by the dialect (`man5/...`, `5/...`).
    section: Option<&'a str>,
    /// A language fixed by the dialect (`man/fr/...`).
    language: Option<&'a str>,
    /// The segment holding the manpage name.
    name: &'a str,
}

/// The pieces of a parsed name segment.
#[derive(Clone, Debug, Default, PartialEq)]
struct NameToken {
    /// The manpage name, as typed.
    name: String,
    /// A section found in the segment (`i3.5`, `i3(5)`, `i3 5`).
    section: Option<String>,
    /// A language suffix found in the segment (`i3.5.fr`).
    language: Option<String>,
}

/// Parses a request into a `Query` against the given index.
///
/// Total over any printable path; the only structural failure is a
/// path with no name segment or with more segments than any dialect
/// produces.
pub fn parse_request(index: &Index, request: &RedirectRequest) -> Result<Query, RedirectError> {
    let malformed = || RedirectError::Malformed {
        path: request.path.clone(),
    };

    // `+` in a path is a common mistake for a blank in the name.
    let path = request.path.replace('+', " ");
    let path = path.trim_start_matches('/').trim_start_matches(' ');

    let (path, raw_suffix) = if let Some(stripped) = path.strip_suffix(".html") {
        (stripped, Some(RawSuffix::Html))
    } else if let Some(stripped) = path.strip_suffix(".gz") {
        (stripped, Some(RawSuffix::Gz))
    } else {
        (path, None)
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(malformed());
    }

    let routed = route_dialect(index, &segments).ok_or_else(malformed)?;
    let token = parse_name_token(index, routed.name);

    let mut query = Query {
        suite: routed.suite.map(str::to_string),
        binarypkg: routed.binarypkg.map(str::to_string),
        name: token.name,
        // Section and language attached to the name segment win over
        // ones fixed by the dialect.
        section: token
            .section
            .or_else(|| routed.section.map(|s| s.to_ascii_lowercase())),
        language: token
            .language
            .or_else(|| routed.language.map(|l| l.to_ascii_lowercase())),
        preferred: request
            .accept_language
            .as_deref()
            .map(PreferredLanguages::parse)
            .unwrap_or_default(),
        raw_suffix,
    };

    // Explicit query parameters override whatever the path said.
    for (field, value) in [
        (&mut query.suite, first_param(&request.query, "suite")),
        (&mut query.binarypkg, first_param(&request.query, "binarypkg")),
        (&mut query.section, first_param(&request.query, "section")),
        (&mut query.language, first_param(&request.query, "language")),
    ] {
        if let Some(value) = value {
            *field = Some(value.to_string());
        }
    }

    Ok(query)
}

/// The first non-empty value of a query parameter.
fn first_param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.as_str())
}

/// Decides which dialect the path segments follow.
fn route_dialect<'a>(index: &Index, segments: &[&'a str]) -> Option<RoutedPath<'a>> {
    if let [name] = *segments {
        return Some(RoutedPath {
            name,
            ..RoutedPath::default()
        });
    }

    if let Some(routed) = route_legacy(index, segments) {
        return Some(routed);
    }

    match *segments {
        [first, name] => {
            if index.suites.contains_key(first) && resolves_to_known_name(index, name) {
                Some(RoutedPath {
                    suite: Some(first),
                    name,
                    ..RoutedPath::default()
                })
            } else if index.is_section(&name.to_ascii_lowercase()) && index.has_name(first) {
                // FreeBSD-style name/section.
                Some(RoutedPath {
                    section: Some(name),
                    name: first,
                    ..RoutedPath::default()
                })
            } else if index.suites.contains_key(first) {
                Some(RoutedPath {
                    suite: Some(first),
                    name,
                    ..RoutedPath::default()
                })
            } else {
                Some(RoutedPath {
                    binarypkg: Some(first),
                    name,
                    ..RoutedPath::default()
                })
            }
        }
        // The suite may be unknown here (`potato/...`); the resolver
        // falls back to the default suite for those.
        [suite, binarypkg, name] => Some(RoutedPath {
            suite: Some(suite),
            binarypkg: Some(binarypkg),
            name,
            ..RoutedPath::default()
        }),
        _ => None,
    }
}

/// Recognizes the legacy manpages.debian.org path forms.
fn route_legacy<'a>(index: &Index, segments: &[&'a str]) -> Option<RoutedPath<'a>> {
    let first = segments[0];

    if segments.len() == 2 {
        // man<digit>/<name>
        if let Some(digits) = man_section(first) {
            return Some(RoutedPath {
                section: Some(digits),
                name: segments[1],
                ..RoutedPath::default()
            });
        }
        // <digit>/<name>
        if first.chars().all(|c| c.is_ascii_digit()) && index.is_section(first) {
            return Some(RoutedPath {
                section: Some(first),
                name: segments[1],
                ..RoutedPath::default()
            });
        }
    }

    // <lang>/man<digit>/<name>
    if let [lang, man, name] = *segments {
        if index.is_lang(lang) {
            if let Some(digits) = man_section(man) {
                return Some(RoutedPath {
                    language: Some(lang),
                    section: Some(digits),
                    name,
                    ..RoutedPath::default()
                });
            }
        }
    }

    if first != "man" {
        return None;
    }

    match *segments {
        // man/<name>
        [_, name] => Some(RoutedPath {
            name,
            ..RoutedPath::default()
        }),
        // man/<lang-or-section-or-suite>/<name>
        [_, mid, name] => {
            let routed = if index.is_lang(mid) {
                RoutedPath {
                    language: Some(mid),
                    name,
                    ..RoutedPath::default()
                }
            } else if index.is_section(&mid.to_ascii_lowercase()) {
                RoutedPath {
                    section: Some(mid),
                    name,
                    ..RoutedPath::default()
                }
            } else if index.suites.contains_key(mid) {
                RoutedPath {
                    suite: Some(mid),
                    name,
                    ..RoutedPath::default()
                }
            } else {
                return None;
            };
            Some(routed)
        }
        // man/<suite>/<lang-or-section>/<name>
        [_, suite, mid, name] => {
            let routed = if index.is_lang(mid) {
                RoutedPath {
                    suite: Some(suite),
                    language: Some(mid),
                    name,
                    ..RoutedPath::default()
                }
            } else if index.is_section(&mid.to_ascii_lowercase()) {
                RoutedPath {
                    suite: Some(suite),
                    section: Some(mid),
                    name,
                    ..RoutedPath::default()
                }
            } else {
                return None;
            };
            Some(routed)
        }
        // man/<suite>/<lang>/<section>/<name>
        [_, suite, lang, section, name]
            if index.is_lang(lang) && index.is_section(&section.to_ascii_lowercase()) =>
        {
            Some(RoutedPath {
                suite: Some(suite),
                language: Some(lang),
                section: Some(section),
                name,
                ..RoutedPath::default()
            })
        }
        _ => None,
    }
}

/// The section digits of a `man<digit>` segment, if it is one.
fn man_section(segment: &str) -> Option<&str> {
    let digits = segment.strip_prefix("man")?;
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

/// Whether a name segment, once taken apart, names a known page.
fn resolves_to_known_name(index: &Index, segment: &str) -> bool {
    index.has_name(&parse_name_token(index, segment).name)
}

/// Takes a name segment apart into name, section and language.
fn parse_name_token(index: &Index, segment: &str) -> NameToken {
    if let Some(token) = split_paren_section(index, segment) {
        return token;
    }
    if segment.contains(' ') {
        return parse_blank_name(index, segment);
    }
    parse_dotted_name(index, segment)
}

/// Handles the parenthesised section forms `name(5)`, `name(5).fr` and
/// `name(5)fr`. Applies only when the parenthesised token is a known
/// section; anything else stays part of the name.
fn split_paren_section(index: &Index, segment: &str) -> Option<NameToken> {
    let open = segment.find('(')?;
    let close = open + segment[open..].find(')')?;
    let section = segment[open + 1..close].to_ascii_lowercase();
    if !index.is_section(&section) {
        return None;
    }

    let after = segment[close + 1..].trim_start_matches('.');
    let after_lower = after.to_ascii_lowercase();
    let language = (!after.is_empty() && index.is_lang(&after_lower)).then_some(after_lower);

    Some(NameToken {
        name: segment[..open].to_string(),
        section: Some(section),
        language,
    })
}

/// Handles names typed with blanks: `git rebase` is tried as-is, then
/// with `-`, then with `_`, first known name wins. A trailing token
/// that is a known section is split off instead (`i3 1`).
fn parse_blank_name(index: &Index, segment: &str) -> NameToken {
    for candidate in [
        segment.to_string(),
        segment.replace(' ', "-"),
        segment.replace(' ', "_"),
    ] {
        if index.has_name(&candidate) {
            return NameToken {
                name: candidate,
                ..NameToken::default()
            };
        }
    }

    if let Some((name, section)) = segment.rsplit_once(' ') {
        let section = section.to_ascii_lowercase();
        if index.is_section(&section) {
            return NameToken {
                name: name.to_string(),
                section: Some(section),
                ..NameToken::default()
            };
        }
    }

    NameToken {
        name: segment.to_string(),
        ..NameToken::default()
    }
}

/// Splits `.section` and `.language` suffixes off a name segment.
///
/// Lookup-driven: the whole segment is tried as a name first, so that
/// `systemd.service` stays intact while `i3.5.fr` is taken apart.
fn parse_dotted_name(index: &Index, segment: &str) -> NameToken {
    if index.has_name(segment) {
        return NameToken {
            name: segment.to_string(),
            ..NameToken::default()
        };
    }

    if let Some((base, last)) = segment.rsplit_once('.') {
        let last = last.to_ascii_lowercase();

        if index.is_lang(&last) {
            if index.has_name(base) {
                return NameToken {
                    name: base.to_string(),
                    language: Some(last),
                    ..NameToken::default()
                };
            }
            if let Some((name, section)) = base.rsplit_once('.') {
                let section = section.to_ascii_lowercase();
                if index.is_section(&section) {
                    return NameToken {
                        name: name.to_string(),
                        section: Some(section),
                        language: Some(last),
                    };
                }
            }
            return NameToken {
                name: base.to_string(),
                language: Some(last),
                ..NameToken::default()
            };
        }

        if index.is_section(&last) {
            return NameToken {
                name: base.to_string(),
                section: Some(last),
                ..NameToken::default()
            };
        }
    }

    NameToken {
        name: segment.to_string(),
        ..NameToken::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::tests::test_index;
    use pretty_assertions::assert_eq;

    fn parse(path: &str) -> Query {
        parse_request(
            &test_index(),
            &RedirectRequest {
                path: path.to_string(),
                ..RedirectRequest::default()
            },
        )
        .expect("path should parse")
    }

    #[test]
    fn bare_name() {
        let q = parse("/i3");
        assert_eq!(q.name, "i3");
        assert_eq!(q.suite, None);
        assert_eq!(q.binarypkg, None);
        assert_eq!(q.section, None);
        assert_eq!(q.language, None);
        assert_eq!(q.raw_suffix, None);
    }

    #[test]
    fn dotted_name_stays_intact_when_known() {
        let q = parse("/systemd.service");
        assert_eq!(q.name, "systemd.service");
        assert_eq!(q.section, None);
        assert_eq!(q.language, None);
    }

    #[test]
    fn section_and_language_suffixes_are_split() {
        let q = parse("/i3.5.fr");
        assert_eq!(
            (q.name.as_str(), q.section.as_deref(), q.language.as_deref()),
            ("i3", Some("5"), Some("fr"))
        );
    }

    #[test]
    fn parenthesised_sections() {
        for path in ["/i3(5).fr", "/i3(5)fr"] {
            let q = parse(path);
            assert_eq!(
                (q.name.as_str(), q.section.as_deref(), q.language.as_deref()),
                ("i3", Some("5"), Some("fr")),
                "path {path:?}"
            );
        }

        // An unknown token in parentheses stays part of the name.
        let q = parse("/foo(bar)");
        assert_eq!(q.name, "foo(bar)");
        assert_eq!(q.section, None);
    }

    #[test]
    fn blank_separated_section() {
        let q = parse("/i3 1");
        assert_eq!((q.name.as_str(), q.section.as_deref()), ("i3", Some("1")));
    }

    #[test]
    fn plus_is_a_blank() {
        let q = parse("/git+rebase");
        assert_eq!(q.name, "git-rebase");
    }

    #[test]
    fn blank_names_try_dash_then_underscore() {
        assert_eq!(parse("/git rebase").name, "git-rebase");
        assert_eq!(parse("/git stash").name, "git_stash");
    }

    #[test]
    fn suite_versus_binarypkg_routing() {
        let q = parse("/testing/i3");
        assert_eq!((q.suite.as_deref(), q.name.as_str()), (Some("testing"), "i3"));

        let q = parse("/i3-wm/i3");
        assert_eq!(
            (q.binarypkg.as_deref(), q.name.as_str()),
            (Some("i3-wm"), "i3")
        );
    }

    #[test]
    fn freebsd_style_name_section() {
        let q = parse("/i3/1");
        assert_eq!((q.name.as_str(), q.section.as_deref()), ("i3", Some("1")));
    }

    #[test]
    fn legacy_forms() {
        let q = parse("/man/fr/i3");
        assert_eq!(
            (q.name.as_str(), q.language.as_deref(), q.section.as_deref()),
            ("i3", Some("fr"), None)
        );

        let q = parse("/man5/i3");
        assert_eq!((q.name.as_str(), q.section.as_deref()), ("i3", Some("5")));

        let q = parse("/5/i3");
        assert_eq!((q.name.as_str(), q.section.as_deref()), ("i3", Some("5")));

        let q = parse("/fr/man1/i3");
        assert_eq!(
            (q.name.as_str(), q.section.as_deref(), q.language.as_deref()),
            ("i3", Some("1"), Some("fr"))
        );

        let q = parse("/man/testing/fr/5/i3");
        assert_eq!(
            (
                q.suite.as_deref(),
                q.language.as_deref(),
                q.section.as_deref(),
                q.name.as_str()
            ),
            (Some("testing"), Some("fr"), Some("5"), "i3")
        );
    }

    #[test]
    fn man_is_also_a_manpage() {
        assert_eq!(parse("/man").name, "man");
        let q = parse("/man(1)");
        assert_eq!((q.name.as_str(), q.section.as_deref()), ("man", Some("1")));
        let q = parse("/man.1.en");
        assert_eq!(
            (q.name.as_str(), q.section.as_deref(), q.language.as_deref()),
            ("man", Some("1"), Some("en"))
        );
    }

    #[test]
    fn raw_suffixes_are_recorded() {
        assert_eq!(parse("/i3.html").raw_suffix, Some(RawSuffix::Html));
        assert_eq!(parse("/i3.1.en.gz").raw_suffix, Some(RawSuffix::Gz));
        assert_eq!(parse("/i3").raw_suffix, None);
    }

    #[test]
    fn leading_blanks_are_stripped() {
        assert_eq!(parse("/ I3").name, "I3");
    }

    #[test]
    fn query_parameters_override_the_path() {
        let q = parse_request(
            &test_index(),
            &RedirectRequest {
                path: "/i3".to_string(),
                query: vec![
                    ("suite".to_string(), "testing".to_string()),
                    ("language".to_string(), "fr".to_string()),
                    // Empty values do not override.
                    ("section".to_string(), String::new()),
                ],
                ..RedirectRequest::default()
            },
        )
        .expect("path should parse");

        assert_eq!(q.suite.as_deref(), Some("testing"));
        assert_eq!(q.language.as_deref(), Some("fr"));
        assert_eq!(q.section, None);
    }

    #[test]
    fn structurally_impossible_paths_fail() {
        let err = parse_request(
            &test_index(),
            &RedirectRequest {
                path: "/".to_string(),
                ..RedirectRequest::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, RedirectError::Malformed { .. }));

        let err = parse_request(
            &test_index(),
            &RedirectRequest {
                path: "/a/b/c/d/e/f".to_string(),
                ..RedirectRequest::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, RedirectError::Malformed { .. }));
    }
}
