//! Request-cycle logging.

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::HttpMessage;
use tracing::Span;
use tracing_actix_web::{RequestId, RootSpanBuilder};

/// Builds the per-request span.
///
/// Every request to this service is one resolution attempt over a
/// single catch-all route, so there is no route pattern worth
/// recording; the interesting facts are the requested target and,
/// once the answer is known, the status and where we sent the client.
pub struct RedirectSpanBuilder;

impl RootSpanBuilder for RedirectSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .map(|id| id.to_string())
            .unwrap_or_default();

        tracing::info_span!(
            "redirect request",
            method = %request.method(),
            requested = %request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or_else(|| request.uri().path()),
            %request_id,
            status = tracing::field::Empty,
            location = tracing::field::Empty,
            error = tracing::field::Empty,
        )
    }

    fn on_request_end<B: MessageBody>(
        span: Span,
        outcome: &Result<ServiceResponse<B>, actix_web::Error>,
    ) {
        match outcome {
            Ok(response) => {
                let status = response.status();
                span.record("status", status.as_u16());

                if let Some(location) = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                {
                    span.record("location", location);
                }
                if let Some(error) = response.response().error() {
                    span.record("error", tracing::field::display(error.as_response_error()));
                }

                if status.is_redirection() {
                    tracing::info!("redirected");
                } else if status.is_server_error() {
                    tracing::error!("request failed");
                } else if status.is_client_error() {
                    // Unknown manpages and junk paths are routine
                    // traffic for a redirector, not warnings.
                    tracing::info!("no redirect for request");
                } else {
                    tracing::info!("request served");
                }
            }
            Err(error) => {
                let response_error = error.as_response_error();
                span.record("status", response_error.status_code().as_u16());
                span.record("error", tracing::field::display(response_error));
                tracing::error!("request failed before a response was built");
            }
        }
    }
}
