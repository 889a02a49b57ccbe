#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for the mandex manpage redirect service.
//!
//! Every incoming path is handed to the resolver in
//! [`mandex_redirect`]; the answer is a `302 Found` to the canonical
//! serving path, a `404` naming the unknown manpage, or a `400` for
//! structurally impossible requests.

mod errors;
mod extractors;
mod logging;
mod redirect;

use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpServer};
use logging::RedirectSpanBuilder;
use mandex_redirect::Redirector;
use mandex_settings::Settings;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/// Run the web server.
///
/// The returned server is a `Future` that must either be `.await`ed, or run as
/// a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those that
/// go into building the listener (the host and port). If you want to respect
/// the settings specified in that object, you must include them in the
/// construction of `listener`.
///
/// # Errors
///
/// Returns an error if the server cannot be started on the provided listener.
///
/// # Examples
///
/// ```no_run
/// use mandex_redirect::{Defaults, Index, Redirector};
///
/// let listener = std::net::TcpListener::bind("127.0.0.1:8000")
///     .expect("Failed to bind port");
/// let settings = mandex_settings::Settings::load()
///     .expect("Failed to load settings");
/// let redirector = Redirector::new(
///     Index::default(),
///     Defaults {
///         suite: settings.redirect.default_suite.clone(),
///         language: settings.redirect.default_language.clone(),
///         section: settings.redirect.default_section.clone(),
///     },
/// );
/// let server = mandex_web::run(listener, settings, redirector)
///     .expect("Failed to start server");
/// ```
pub fn run(
    listener: TcpListener,
    settings: Settings,
    redirector: Redirector,
) -> Result<Server, std::io::Error> {
    let num_workers = settings.http.workers;
    let redirector = web::Data::new(redirector);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(redirector.clone())
            .wrap(TracingLogger::<RedirectSpanBuilder>::new())
            .wrap(Cors::permissive())
            // The whole URL space belongs to the resolver.
            .default_service(web::to(redirect::redirect))
    })
    .listen(listener)?;

    if let Some(workers) = num_workers {
        server = server.workers(workers);
    }

    Ok(server.run())
}
