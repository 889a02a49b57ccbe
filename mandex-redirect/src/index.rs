//! The read-only catalog of known manual pages.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// A single manual page known to the archive.
///
/// Entries are value-typed and deduplicated by the index producer. The
/// `name` and `binarypkg` fields carry the on-disk casing, which is
/// preserved in serving paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    /// The manpage name, e.g. `i3` or `systemd.service`.
    pub name: String,

    /// The concrete suite shipping this page, e.g. `jessie`. Always a
    /// value of the index's suite map, never an alias.
    pub suite: String,

    /// The binary package shipping this page, e.g. `i3-wm`.
    pub binarypkg: String,

    /// The manual section, e.g. `1` or the subsection `3edit`.
    pub section: String,

    /// The language code of the page, e.g. `en` or `fr`.
    pub language: String,
}

impl IndexEntry {
    /// The canonical serving path for this entry, e.g.
    /// `/jessie/i3-wm/i3.1.en.html`. `ext` is the bare extension,
    /// without a leading dot.
    pub fn serving_path(&self, ext: &str) -> String {
        format!(
            "/{}/{}/{}.{}.{}.{}",
            self.suite, self.binarypkg, self.name, self.section, self.language, ext
        )
    }

    /// The leading-digit prefix of the section, which identifies the
    /// primary section a subsection belongs to (`3edit` → `3`).
    pub fn primary_section(&self) -> &str {
        primary_section(&self.section)
    }
}

/// The leading-digit prefix of a section code.
pub(crate) fn primary_section(section: &str) -> &str {
    let end = section
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(section.len());
    &section[..end]
}

/// An immutable catalog of every manual page the archive can serve,
/// along with the auxiliary sets the URL parser consults.
///
/// The index is produced in one shot by the archive metadata importer
/// and never mutated afterwards, so request handlers share it without
/// locking. Beyond structural well-formedness nothing is validated
/// here; the producer guarantees that every entry's suite, section and
/// language appear in the corresponding tables.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Index {
    /// Every language code that occurs in the archive.
    pub langs: HashSet<String>,

    /// Every section code that occurs in the archive, subsections
    /// included (`3edit` is a member in its own right).
    pub sections: HashSet<String>,

    /// Maps suite names and aliases to concrete suites. Concrete suites
    /// map to themselves; aliases like `stable` or rolling names like
    /// `stretch` map to their current target.
    pub suites: HashMap<String, String>,

    /// Maps lowercased manpage names to their entries, in the
    /// producer's insertion order. Present keys have at least one entry.
    pub entries: HashMap<String, Vec<IndexEntry>>,
}

impl Index {
    /// Resolves a suite name or alias to its concrete suite. Unknown
    /// names return `None`; the resolver treats those as unspecified
    /// rather than failing.
    pub fn resolve_suite(&self, alias: &str) -> Option<&str> {
        self.suites.get(alias).map(String::as_str)
    }

    /// The entries for `name`, in insertion order. Names are matched
    /// case-insensitively.
    pub fn candidates(&self, name: &str) -> Option<&[IndexEntry]> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// Whether any entry is known under `name` (case-insensitive).
    pub fn has_name(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Whether `code` is a known language code.
    pub(crate) fn is_lang(&self, code: &str) -> bool {
        self.langs.contains(code)
    }

    /// Whether `code` is a known section code.
    pub(crate) fn is_section(&self, code: &str) -> bool {
        self.sections.contains(code)
    }
}
