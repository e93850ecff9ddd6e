// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::elements::{DeserializedReporterConfig, ReporterOptions};
use crate::errors::ConfigError;
use camino::Utf8Path;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Specifies where to load reporter configuration from.
#[derive(Clone, Copy, Debug)]
pub enum ConfigLocation<'a> {
    /// Skip loading a config file entirely, using only built-in defaults.
    Isolated,

    /// Load configuration from an explicit path.
    ///
    /// Returns an error if the file does not exist.
    Explicit(&'a Utf8Path),
}

impl ReporterOptions {
    /// Loads reporter options: the embedded defaults, overlaid with the config file at `location`.
    pub fn load(location: ConfigLocation<'_>) -> Result<Self, ConfigError> {
        Self::load_with_warnings(location, &mut DefaultConfigWarnings)
    }

    fn load_with_warnings(
        location: ConfigLocation<'_>,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigError> {
        let mut options = Self::from_embedded();
        match location {
            ConfigLocation::Isolated => {
                debug!("reporter config: skipping config file (isolated)");
            }
            ConfigLocation::Explicit(path) => {
                let user = DeserializedReporterConfig::from_path_with_warnings(path, warnings)?;
                options.apply(&user);
            }
        }
        Ok(options)
    }

    const DEFAULT_CONFIG: &'static str = include_str!("../../default-config.toml");

    /// Parses the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded configuration is invalid or has unknown keys. This is checked by
    /// tests.
    pub(crate) fn from_embedded() -> Self {
        let (options, unknown) = deserialize_toml::<Self>(Self::DEFAULT_CONFIG)
            .expect("embedded default config should be valid");
        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
        options
    }
}

/// Handles warnings produced while loading configuration.
trait ConfigWarnings {
    /// Handles unknown keys found in a config file.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

/// Logs warnings through `tracing`.
struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        if let [key] = unknown.iter().collect::<Vec<_>>().as_slice() {
            // Print this on the same line.
            unknown_str.push_str("key: ");
            unknown_str.push_str(key);
        } else {
            unknown_str.push_str("keys:\n");
            for ignored_key in unknown {
                unknown_str.push('\n');
                unknown_str.push_str("  - ");
                unknown_str.push_str(ignored_key);
            }
        }

        warn!("in config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}

impl DeserializedReporterConfig {
    fn from_path_with_warnings(
        path: &Utf8Path,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigError> {
        debug!("reporter config: loading from {path}");
        let contents = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_owned(),
            error,
        })?;

        let (config, unknown) =
            deserialize_toml::<Self>(&contents).map_err(|error| ConfigError::Parse {
                path: path.to_owned(),
                error,
            })?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        debug!("reporter config: loaded successfully from {path}");
        Ok(config)
    }
}

fn deserialize_toml<T: DeserializeOwned>(
    contents: &str,
) -> Result<(T, BTreeSet<String>), toml::de::Error> {
    let deserializer = toml::Deserializer::parse(contents)?;
    let mut unknown = BTreeSet::new();
    let config: T = serde_ignored::deserialize(deserializer, |path| {
        unknown.insert(path.to_string());
    })?;
    Ok((config, unknown))
}
