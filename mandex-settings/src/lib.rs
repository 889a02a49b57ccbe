//! # Mandex Settings
//!
//! The top level settings struct is [Settings]. If you are looking for
//! documentation about the settings that can be set, start there.
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `MANDEX_ENV`. The
//!    settings for that environment are then loaded from `config/${env}.yaml`, if
//!    it exists. The default environment is "development". A "production"
//!    environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use for
//!    local configuration and secrets if desired.
//! 4. Environment variables that begin with `MANDEX_` and use `__` as a level
//!    separator. For example, `Settings::http::workers` can be controlled from the
//!    environment variable `MANDEX_HTTP__WORKERS`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, any format supported
//! by the [config] crate can be used, including JSON and TOML. To choose another
//! format, simply use a different extension for your file, like
//! `config/local.toml`.

mod logging;

pub use logging::{LogFormat, LogLevel, LoggingSettings};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};

/// Top level settings object for mandex.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment mandex is running in. Should only be set with the
    /// `MANDEX_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not be
    /// set to true in production environments.
    pub debug: bool,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Fallbacks used for fields a request leaves unspecified.
    pub redirect: RedirectSettings,

    /// Where the serving index comes from.
    pub index: IndexSettings,

    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8000" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Fallbacks applied when a request does not specify a field. These
/// are fixed when the redirector is constructed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RedirectSettings {
    /// The suite served when none is requested, e.g. `jessie`.
    pub default_suite: String,

    /// The language served when neither the path nor `Accept-Language`
    /// yields a match, e.g. `en`.
    pub default_language: String,

    /// The section preferred when none is requested, e.g. `1`.
    pub default_section: String,
}

/// Where the serving index comes from.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexSettings {
    /// The path, relative or absolute, to the serialized index produced
    /// by the archive importer.
    pub path: PathBuf,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self> {
        let mut s = Config::new();

        // Start off with the base config.
        s.merge(File::with_name("./config/base"))
            .context("loading base config")?;

        // Merge in an environment specific config.
        let mandex_env = std::env::var("MANDEX_ENV").unwrap_or_else(|_| "development".to_string());
        s.set("env", mandex_env.as_str())
            .context("loading mandex environment name")?;
        s.merge(File::with_name(&format!("config/{}", s.get::<String>("env")?)).required(false))
            .context("loading environment config")?;

        // Add a local configuration file that is `.gitignore`ed.
        s.merge(File::with_name("config/local").required(false))
            .context("loading local config overrides")?;

        // Add environment variables that start with "MANDEX_" and have "__" to
        // separate levels. For example, `MANDEX_HTTP__LISTEN` maps to
        // `Settings::http::listen`.
        s.merge(Environment::default().prefix("MANDEX").separator("__"))
            .context("merging config")?;

        let settings: Settings =
            serde_path_to_error::deserialize(s).context("Deserializing settings")?;

        Ok(settings)
    }

    /// Load settings from configuration files for tests.
    pub fn load_for_tests() -> Self {
        let mut s = Config::new();

        // Start off with the base config.
        s.merge(File::with_name("../config/base"))
            .expect("Could not load base settings");

        // Merge in test specific config.
        s.set("env", "test").expect("Could not set env for tests");
        s.merge(File::with_name("../config/test"))
            .expect("Could not load test settings");

        // Add a local configuration file that is `.gitignore`ed.
        s.merge(File::with_name("../config/local_test").required(false))
            .expect("Could not load local settings for tests");

        s.try_into().expect("Could not convert settings")
    }
}

#[cfg(test)]
mod tests {
    use crate::Settings;
    use anyhow::{Context, Result};
    use config::{Config, File};

    fn load_config_files(files: &[&str]) -> Result<Config> {
        let mut config = Config::new();
        for f in files {
            config
                .merge(File::with_name(f))
                .context(format!("Loading config {}", f))?;
        }

        Ok(config)
    }

    #[test]
    fn every_shipped_config_loads() {
        for config_name in ["development", "production", "test"] {
            let mut config =
                load_config_files(&["../config/base", &format!("../config/{}", config_name)])
                    .expect("could not read config files");

            // env is a required field that should never be set in the provided files.
            assert!(config.get_str("env").is_err());
            config.set("env", config_name).expect("Could not set value");

            let settings = config.try_into::<Settings>();
            if let Err(err) = &settings {
                println!("Problem while testing {} config: {}", config_name, err);
            }
            assert!(settings.is_ok());
        }
    }

    #[test]
    fn test_settings_load() {
        let settings = Settings::load_for_tests();
        assert_eq!(settings.env, "test");
        assert_eq!(settings.redirect.default_suite, "jessie");
        assert_eq!(settings.redirect.default_language, "en");
        assert_eq!(settings.redirect.default_section, "1");
        assert_eq!(settings.logging.level, crate::LogLevel::Error);
    }
}
