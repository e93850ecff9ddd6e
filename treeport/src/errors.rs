// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    TreeportExitCode,
    output::{NO_HEADING_TARGET, StderrStyles},
};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;
use treeport_reporter::errors::{ConfigError, WriteEventError};

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholder messages: the expected way to print out errors is with
// the display_to_stderr method, which colorizes errors.

/// An expected error: a user or environment issue rather than a bug in treeport.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("failed to load reporter config")]
    ConfigLoadError {
        #[from]
        err: ConfigError,
    },
    #[error("failed to read events from {path}")]
    EventsReadError {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to parse event at {path}:{line_number}")]
    EventParseError {
        path: Utf8PathBuf,
        line_number: usize,
        #[source]
        err: serde_json::Error,
    },
    #[error("failed to write output")]
    WriteOutputError {
        #[from]
        err: WriteEventError,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::ConfigLoadError { .. }
            | Self::EventsReadError { .. }
            | Self::EventParseError { .. } => TreeportExitCode::SETUP_ERROR,
            Self::WriteOutputError { .. } => TreeportExitCode::WRITE_OUTPUT_ERROR,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::ConfigLoadError { err } => {
                error!("failed to load reporter config");
                Some(err as &dyn Error)
            }
            Self::EventsReadError { path, err } => {
                error!("failed to read events from {}", path.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::EventParseError {
                path,
                line_number,
                err,
            } => {
                let location = format!("{path}:{line_number}");
                error!("failed to parse event at {}", location.style(styles.bold));
                Some(err as &dyn Error)
            }
            Self::WriteOutputError { err } => {
                error!("failed to write output");
                Some(err as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
