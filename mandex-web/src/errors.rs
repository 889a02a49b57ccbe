//! Any errors that mandex-web might generate, and supporting implementations.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// An error that happened in a web handler.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// No manpage matches the requested name. Rendered as a 404 page
    /// with a suggestion when the resolver has one.
    #[error("no manpage matches {manpage:?}")]
    NotFound {
        /// The name token the user asked for, as typed.
        manpage: String,

        /// The serving path of the closest candidate, if any.
        suggestion: Option<String>,
    },

    /// An error that indicates that part of the request is malformed.
    #[error("malformed request: {0}")]
    Malformed(&'static str),
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::NotFound { .. } => StatusCode::NOT_FOUND,
            HandlerError::Malformed(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = serde_json::json!({ "error": self.to_string() });
        if let HandlerError::NotFound {
            suggestion: Some(suggestion),
            ..
        } = self
        {
            body["did_you_mean"] = serde_json::Value::String(suggestion.clone());
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}
