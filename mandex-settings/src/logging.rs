//! Logging configuration: a default level, per-target overrides, and
//! the output format.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// The level below which log events are discarded.
    pub level: LogLevel,

    /// Per-target overrides of [`level`](Self::level), keyed by crate
    /// or module path:
    ///
    /// ```yaml
    /// # config/local.yaml
    /// logging:
    ///   level: INFO
    ///   targets:
    ///     mandex_web: DEBUG       # noisier logs from the web crate
    ///     mandex_redirect: DEBUG  # and from the resolver
    /// ```
    #[serde(default)]
    pub targets: BTreeMap<String, LogLevel>,

    /// The format to output logs in.
    pub format: LogFormat,
}

impl LoggingSettings {
    /// Builds the tracing filter for these settings.
    ///
    /// The environment variable `RUST_LOG` wins outright when set: an
    /// operator chasing a problem should not have to edit config files
    /// to change verbosity.
    pub fn env_filter(&self) -> Result<EnvFilter> {
        match std::env::var("RUST_LOG") {
            Ok(spec) => {
                EnvFilter::try_new(&spec).with_context(|| format!("parsing RUST_LOG {:?}", spec))
            }
            Err(_) => self.configured_filter(),
        }
    }

    /// The filter described by the settings alone.
    fn configured_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::new(self.level.directive());

        for (target, level) in &self.targets {
            // Crate names reach tracing with underscores; a hyphenated
            // target would be accepted and then never match anything.
            if target.contains('-') {
                bail!(
                    "log target {:?}: targets use underscores, not hyphens",
                    target
                );
            }
            let directive = format!("{}={}", target, level.directive());
            filter = filter.add_directive(
                directive
                    .parse()
                    .with_context(|| format!("log target {:?}", target))?,
            );
        }

        Ok(filter)
    }
}

/// A log verbosity threshold, in increasing order of noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Only failures that lost a request or worse.
    Error,

    /// Suspicious but survivable conditions.
    Warn,

    /// One event per notable action; the production default.
    Info,

    /// Resolution internals, e.g. dropped query constraints.
    Debug,

    /// Everything.
    Trace,
}

impl LogLevel {
    /// The spelling `tracing_subscriber` filter directives use.
    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// The format to output logs in.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// [`tracing-subscriber`]'s human targeted, pretty format. Includes
    /// more information, multiple lines per log event.
    Pretty,

    /// [`tracing-subscriber`]'s default format. One line per log event.
    Compact,

    /// [`tracing-subscriber`]'s JSON format, for log pipelines. One
    /// line per log event.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(level: LogLevel, targets: &[(&str, LogLevel)]) -> LoggingSettings {
        LoggingSettings {
            level,
            targets: targets
                .iter()
                .map(|(target, level)| (target.to_string(), *level))
                .collect(),
            format: LogFormat::Compact,
        }
    }

    #[test]
    fn filter_includes_default_and_target_levels() {
        let filter = settings(LogLevel::Info, &[("mandex_web", LogLevel::Debug)])
            .configured_filter()
            .unwrap();

        let rendered = filter.to_string();
        assert!(rendered.contains("info"), "{rendered}");
        assert!(rendered.contains("mandex_web=debug"), "{rendered}");
    }

    #[test]
    fn targets_alone_do_not_silence_the_default() {
        let filter = settings(LogLevel::Warn, &[])
            .configured_filter()
            .unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn hyphenated_targets_are_rejected() {
        let err = settings(LogLevel::Info, &[("mandex-web", LogLevel::Debug)])
            .configured_filter()
            .unwrap_err();
        assert!(err.to_string().contains("underscores"), "{err}");
    }
}
