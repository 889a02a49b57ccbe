//! The failure taxonomy of the resolver.

use thiserror::Error;

use crate::index::IndexEntry;

/// Why a request could not be resolved to a serving path.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RedirectError {
    /// The request path was structurally impossible to parse. Callers
    /// should answer with a client error.
    #[error("malformed request path {path:?}")]
    Malformed {
        /// The offending path, as received.
        path: String,
    },

    /// Parsing succeeded but the archive has no page to serve. Callers
    /// should answer with a not-found page naming the manpage.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl RedirectError {
    /// The `NotFoundError` inside, if that is what this error is.
    /// Keeps the two failure kinds discriminable without pattern
    /// matching at every call site.
    pub fn as_not_found(&self) -> Option<&NotFoundError> {
        match self {
            RedirectError::NotFound(err) => Some(err),
            RedirectError::Malformed { .. } => None,
        }
    }
}

/// No page in the archive matches the requested name.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("no manpage matches {manpage:?}")]
pub struct NotFoundError {
    /// The manpage name token the user asked for, as typed.
    pub manpage: String,

    /// The entry the resolver would have picked had fewer fields been
    /// constrained, when one exists. Suitable for a "did you mean" page.
    pub best_choice: Option<IndexEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_discriminable() {
        let err = RedirectError::from(NotFoundError {
            manpage: "o3".to_string(),
            best_choice: None,
        });
        assert_eq!(err.as_not_found().map(|e| e.manpage.as_str()), Some("o3"));

        let err = RedirectError::Malformed {
            path: "/a/b/c/d/e/f".to_string(),
        };
        assert!(err.as_not_found().is_none());
    }

    #[test]
    fn display_names_the_manpage() {
        let err = NotFoundError {
            manpage: "git rebase".to_string(),
            best_choice: None,
        };
        assert_eq!(err.to_string(), "no manpage matches \"git rebase\"");
    }
}
