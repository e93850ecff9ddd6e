// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by treeport.

use crate::reporter::Theme;
use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// An error that occurred while loading reporter configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file at `{path}`")]
    Read {
        /// The path that was read.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The config file was read but could not be parsed.
    #[error("failed to parse config file at `{path}`")]
    Parse {
        /// The path that was parsed.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },
}

/// Error returned while parsing a [`Theme`] value from a string.
#[derive(Clone, Debug, Error)]
#[error(
    "unrecognized value for theme: {input}\n(known values: {})",
    Theme::variants().join(", "),
)]
pub struct ThemeParseError {
    input: String,
}

impl ThemeParseError {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// An error that occurred while writing rendered lines to a sink.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing a line to the output sink.
    #[error("error writing to output")]
    Io(#[source] io::Error),
}

/// Displays an error along with its chain of sources, one per line.
#[derive(Clone, Copy, Debug)]
pub struct DisplayErrorChain<E>(E);

impl<E: std::error::Error> DisplayErrorChain<E> {
    /// Creates a new `DisplayErrorChain`.
    pub fn new(error: E) -> Self {
        Self(error)
    }
}

impl<E: std::error::Error> std::fmt::Display for DisplayErrorChain<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(error) = source {
            write!(f, "\n  caused by:\n  - {error}")?;
            source = error.source();
        }
        Ok(())
    }
}
