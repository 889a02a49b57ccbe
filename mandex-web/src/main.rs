#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Binary entry point for the mandex redirect service.

use anyhow::{Context, Result};
use mandex_redirect::{Defaults, Index, Redirector};
use mandex_settings::{LogFormat, Settings};
use std::{fs::File, io::BufReader, net::TcpListener};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;

/// Primary entry point
#[actix_web::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings).context("initializing logging")?;

    let redirector = load_redirector(&settings).context("loading the serving index")?;

    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;
    mandex_web::run(listener, settings, redirector)
        .context("Starting mandex-web server")?
        .await
        .context("Running mandex-web server")?;

    Ok(())
}

/// Install the global tracing subscriber the settings describe.
fn init_logging(settings: &Settings) -> Result<()> {
    // Libraries below us still speak `log`; route their records in too.
    LogTracer::init().context("routing log records into tracing")?;

    let filter = settings
        .logging
        .env_filter()
        .context("building the log filter")?;

    // The three formats produce differently typed subscribers, so each
    // arm installs its own registry stack.
    match settings.logging.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().pretty());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().compact());
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json());
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    tracing::debug!(format = ?settings.logging.format, "logging initialized");

    Ok(())
}

/// Read the serialized index the archive importer produced and build
/// the redirector over it.
fn load_redirector(settings: &Settings) -> Result<Redirector> {
    let file = File::open(&settings.index.path)
        .with_context(|| format!("opening index file {}", settings.index.path.display()))?;
    let index: Index =
        serde_json::from_reader(BufReader::new(file)).context("decoding index file")?;

    tracing::info!(
        names = index.entries.len(),
        suites = index.suites.len(),
        langs = index.langs.len(),
        "index loaded"
    );

    Ok(Redirector::new(
        index,
        Defaults {
            suite: settings.redirect.default_suite.clone(),
            language: settings.redirect.default_language.clone(),
            section: settings.redirect.default_section.clone(),
        },
    ))
}
