#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Resolution of underspecified manpage URLs for [mandex](../mandex_web/index.html).
//!
//! Users reach the archive through every URL shape it has ever had:
//! `/i3`, `/testing/i3.5.fr`, `/man/testing/fr/5/i3`, `/i3(1)`, even
//! `/git rebase`. This crate parses those dialects into a partially
//! specified [`Query`], fills in the missing fields from the immutable
//! [`Index`] and the configured [`Defaults`], and emits the canonical
//! serving path `/<suite>/<binarypkg>/<name>.<section>.<language>.html`
//! (or `.gz` for raw pages).
//!
//! The index is built once by an external producer and shared read-only
//! by every request handler; resolution is pure computation over it.

mod errors;
mod index;
mod language;
mod parse;
mod resolve;

pub use errors::{NotFoundError, RedirectError};
pub use index::{Index, IndexEntry};
pub use language::{LanguageRange, LanguageTag, PreferredLanguages};
pub use parse::{Query, RawSuffix, RedirectRequest};
pub use resolve::{Defaults, Redirector};
