//! Types to extract redirect requests from HTTP requests.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, Error as ActixError, FromRequest, HttpRequest};
use mandex_redirect::RedirectRequest;
use percent_encoding::percent_decode_str;

use crate::errors::HandlerError;

/// An extractor for a [`mandex_redirect::RedirectRequest`].
///
/// Assembles the percent-decoded path, the decoded query pairs and the
/// raw `Accept-Language` header; everything else about the request is
/// the resolver's business.
#[derive(Debug, PartialEq)]
pub struct RedirectRequestWrapper(pub RedirectRequest);

impl FromRequest for RedirectRequestWrapper {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

/// Pulls the resolver's inputs out of the request.
fn extract(req: &HttpRequest) -> Result<RedirectRequestWrapper, ActixError> {
    let path = percent_decode_str(req.uri().path())
        .decode_utf8()
        .map_err(|_| ActixError::from(HandlerError::Malformed("path is not valid UTF-8")))?
        .into_owned();

    let query: Vec<(String, String)> = serde_urlencoded::from_str(req.query_string())
        .map_err(|_| ActixError::from(HandlerError::Malformed("query string")))?;

    // A header that is not valid visible ASCII is treated as absent
    // rather than failing the request.
    let accept_language = req
        .headers()
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    Ok(RedirectRequestWrapper(RedirectRequest {
        path,
        query,
        accept_language,
    }))
}
