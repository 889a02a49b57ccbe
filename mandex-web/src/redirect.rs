//! The web handler turning resolved paths into HTTP redirects.

use actix_web::{http::header, web::Data, HttpResponse};
use mandex_redirect::{RedirectError, Redirector};

use crate::{errors::HandlerError, extractors::RedirectRequestWrapper};

/// Resolve the requested path and redirect to the canonical one.
///
/// Registered as the app's default service: every path that is not a
/// canonical serving path lands here.
pub async fn redirect(
    RedirectRequestWrapper(request): RedirectRequestWrapper,
    redirector: Data<Redirector>,
) -> Result<HttpResponse, HandlerError> {
    let location = redirector.redirect(&request).map_err(|error| match error {
        RedirectError::NotFound(not_found) => {
            tracing::debug!(manpage = %not_found.manpage, "manpage not found");
            HandlerError::NotFound {
                suggestion: not_found
                    .best_choice
                    .as_ref()
                    .map(|entry| entry.serving_path("html")),
                manpage: not_found.manpage,
            }
        }
        RedirectError::Malformed { path } => {
            tracing::debug!(%path, "request path failed to parse");
            HandlerError::Malformed("path")
        }
    })?;

    tracing::debug!(%location, "redirecting");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{
        http::{header, StatusCode},
        test, web, App,
    };
    use mandex_redirect::{Defaults, Index, IndexEntry, Redirector};
    use pretty_assertions::assert_eq;

    fn entry(suite: &str, section: &str, language: &str) -> IndexEntry {
        IndexEntry {
            name: "i3".to_string(),
            suite: suite.to_string(),
            binarypkg: "i3-wm".to_string(),
            section: section.to_string(),
            language: language.to_string(),
        }
    }

    fn redirector() -> Redirector {
        let mut index = Index {
            langs: ["en", "fr"].iter().map(|s| s.to_string()).collect(),
            sections: ["1", "5"].iter().map(|s| s.to_string()).collect(),
            suites: [("jessie", "jessie"), ("testing", "testing"), ("stable", "jessie")]
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Index::default()
        };
        index.entries.insert(
            "i3".to_string(),
            vec![
                entry("jessie", "1", "en"),
                entry("jessie", "1", "fr"),
                entry("testing", "1", "en"),
                entry("testing", "1", "fr"),
            ],
        );
        index.entries.insert(
            "git-rebase".to_string(),
            vec![IndexEntry {
                name: "git-rebase".to_string(),
                suite: "jessie".to_string(),
                binarypkg: "git-man".to_string(),
                section: "1".to_string(),
                language: "en".to_string(),
            }],
        );

        Redirector::new(
            index,
            Defaults {
                suite: "jessie".to_string(),
                language: "en".to_string(),
                section: "1".to_string(),
            },
        )
    }

    async fn location_for(request: test::TestRequest) -> (StatusCode, Option<String>) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(redirector()))
                .default_service(web::to(super::redirect)),
        )
        .await;

        let response = test::call_service(&app, request.to_request()).await;
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        (response.status(), location)
    }

    #[actix_rt::test]
    async fn resolvable_paths_redirect() {
        let (status, location) = location_for(test::TestRequest::with_uri("/i3")).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some("/jessie/i3-wm/i3.1.en.html"));
    }

    #[actix_rt::test]
    async fn percent_encoded_blanks_resolve() {
        let (status, location) =
            location_for(test::TestRequest::with_uri("/git%20rebase")).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(
            location.as_deref(),
            Some("/jessie/git-man/git-rebase.1.en.html")
        );
    }

    #[actix_rt::test]
    async fn plus_separated_blanks_resolve() {
        let (status, location) = location_for(test::TestRequest::with_uri("/git+rebase")).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(
            location.as_deref(),
            Some("/jessie/git-man/git-rebase.1.en.html")
        );
    }

    #[actix_rt::test]
    async fn accept_language_steers_the_redirect() {
        let (status, location) = location_for(
            test::TestRequest::with_uri("/i3")
                .insert_header(("Accept-Language", "fr-CH, fr;q=0.9, en;q=0.8")),
        )
        .await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some("/jessie/i3-wm/i3.1.fr.html"));
    }

    #[actix_rt::test]
    async fn query_parameters_override_the_path() {
        let (status, location) =
            location_for(test::TestRequest::with_uri("/i3?suite=testing&language=fr")).await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some("/testing/i3-wm/i3.1.fr.html"));
    }

    #[actix_rt::test]
    async fn unknown_manpages_are_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(redirector()))
                .default_service(web::to(super::redirect)),
        )
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::with_uri("/no-such-page").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(
            body["error"],
            serde_json::json!("no manpage matches \"no-such-page\"")
        );
    }
}
