// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::reporter::{ReportStatus, Theme};
use serde::Deserialize;

/// Options that control how completed families are rendered.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ReporterOptions {
    /// The glyphs used to draw the tree.
    pub theme: Theme,

    /// Whether to hide the lines of tests that passed.
    ///
    /// Detail blocks for passing tests are still printed if configured.
    pub hide_successes: bool,

    /// When to print stack traces.
    pub stack_trace: StackTraceOptions,

    /// When to replay captured standard output.
    pub stdout: CapturedOutputOptions,

    /// When to replay captured standard error.
    pub stderr: CapturedOutputOptions,

    /// Whether to print a blank line before each top-level family.
    pub blank_line_between_prints: bool,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Auto,
            hide_successes: false,
            stack_trace: StackTraceOptions {
                on_error: true,
                on_failure: true,
            },
            stdout: CapturedOutputOptions::ON_ERROR_OR_FAILURE,
            stderr: CapturedOutputOptions::ON_ERROR_OR_FAILURE,
            blank_line_between_prints: false,
        }
    }
}

impl ReporterOptions {
    /// Overlays the settings present in a user config onto these options.
    pub(super) fn apply(&mut self, user: &DeserializedReporterConfig) {
        if let Some(theme) = user.theme {
            self.theme = theme;
        }
        if let Some(hide_successes) = user.hide_successes {
            self.hide_successes = hide_successes;
        }
        if let Some(blank_line) = user.blank_line_between_prints {
            self.blank_line_between_prints = blank_line;
        }
        self.stack_trace.apply(&user.stack_trace);
        self.stdout.apply(&user.stdout);
        self.stderr.apply(&user.stderr);
    }
}

/// When to print the stack trace of a test.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct StackTraceOptions {
    /// Print for tests that raised an unexpected error.
    pub on_error: bool,

    /// Print for tests that failed an assertion.
    pub on_failure: bool,
}

impl StackTraceOptions {
    /// Returns true if the stack trace of a test with this status should be printed.
    pub fn shows(&self, status: ReportStatus) -> bool {
        match status {
            ReportStatus::Error => self.on_error,
            ReportStatus::Failure => self.on_failure,
            ReportStatus::Success | ReportStatus::Skipped => false,
        }
    }

    fn apply(&mut self, user: &DeserializedStackTraceConfig) {
        if let Some(on_error) = user.on_error {
            self.on_error = on_error;
        }
        if let Some(on_failure) = user.on_failure {
            self.on_failure = on_failure;
        }
    }
}

/// When to replay a captured output stream of a test.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CapturedOutputOptions {
    /// Replay for tests that passed.
    pub on_success: bool,

    /// Replay for tests that raised an unexpected error.
    pub on_error: bool,

    /// Replay for tests that failed an assertion.
    pub on_failure: bool,
}

impl CapturedOutputOptions {
    /// Replay output for tests that errored or failed, but not for tests that passed.
    pub const ON_ERROR_OR_FAILURE: Self = Self {
        on_success: false,
        on_error: true,
        on_failure: true,
    };

    /// Returns true if captured output of a test with this status should be replayed.
    ///
    /// Output is never replayed for skipped tests.
    pub fn shows(&self, status: ReportStatus) -> bool {
        match status {
            ReportStatus::Success => self.on_success,
            ReportStatus::Error => self.on_error,
            ReportStatus::Failure => self.on_failure,
            ReportStatus::Skipped => false,
        }
    }

    fn apply(&mut self, user: &DeserializedCapturedOutputConfig) {
        if let Some(on_success) = user.on_success {
            self.on_success = on_success;
        }
        if let Some(on_error) = user.on_error {
            self.on_error = on_error;
        }
        if let Some(on_failure) = user.on_failure {
            self.on_failure = on_failure;
        }
    }
}

/// Reporter configuration as read from a user config file, where every setting is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct DeserializedReporterConfig {
    #[serde(default)]
    pub(super) theme: Option<Theme>,
    #[serde(default)]
    pub(super) hide_successes: Option<bool>,
    #[serde(default)]
    pub(super) blank_line_between_prints: Option<bool>,
    #[serde(default)]
    pub(super) stack_trace: DeserializedStackTraceConfig,
    #[serde(default)]
    pub(super) stdout: DeserializedCapturedOutputConfig,
    #[serde(default)]
    pub(super) stderr: DeserializedCapturedOutputConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct DeserializedStackTraceConfig {
    #[serde(default)]
    pub(super) on_error: Option<bool>,
    #[serde(default)]
    pub(super) on_failure: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(super) struct DeserializedCapturedOutputConfig {
    #[serde(default)]
    pub(super) on_success: Option<bool>,
    #[serde(default)]
    pub(super) on_error: Option<bool>,
    #[serde(default)]
    pub(super) on_failure: Option<bool>,
}
