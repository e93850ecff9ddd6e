// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events consumed by the reporter, and the report entries they carry.
//!
//! The execution engine produces a [`ReportEvent::ScopeStarting`] for every scope before it runs,
//! and a [`ReportEvent::ScopeCompleted`] once the scope and all of its tests are done.

use crate::{names::abbreviate_name, tree::Node};
use bytes::Bytes;
use serde::Deserialize;
use smol_str::SmolStr;
use std::{borrow::Cow, time::Duration};

/// An event emitted by the test-execution engine.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ReportEvent {
    /// A scope is about to run.
    #[serde(rename_all = "kebab-case")]
    ScopeStarting {
        /// The qualified name of the scope, e.g. `org.example.Outer$Inner`.
        qualified_name: String,
    },

    /// A scope has completed.
    #[serde(rename_all = "kebab-case")]
    ScopeCompleted {
        /// The class-level summary of the scope.
        class_summary: ReportEntry,

        /// The results of the tests run within the scope, in the order they finished.
        #[serde(default)]
        members: Vec<ReportEntry>,
    },
}

/// The outcome of a test or a scope.
#[derive(Copy, Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    /// The test passed.
    #[default]
    Success,

    /// An assertion within the test failed.
    Failure,

    /// The test raised an unexpected error.
    Error,

    /// The test was not run.
    Skipped,
}

impl ReportStatus {
    /// Returns true for [`Failure`](Self::Failure) and [`Error`](Self::Error).
    pub fn is_error_or_failure(self) -> bool {
        matches!(self, Self::Failure | Self::Error)
    }
}

/// One observed outcome: either the summary of a scope or the result of a single test.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ReportEntry {
    /// The qualified name of the scope this entry belongs to.
    pub scope_name: String,

    /// The human-readable name of the scope, if different from `scope_name`.
    #[serde(default)]
    pub scope_display_name: Option<String>,

    /// The name of the test. `None` for scope summaries.
    #[serde(default)]
    pub test_name: Option<String>,

    /// The human-readable name of the test, if different from `test_name`.
    #[serde(default)]
    pub test_display_name: Option<String>,

    /// The outcome.
    #[serde(default)]
    pub status: ReportStatus,

    /// How long the test or scope took.
    #[serde(default, with = "humantime_serde")]
    pub elapsed: Duration,

    /// A message associated with the outcome, e.g. the reason a test was skipped.
    #[serde(default)]
    pub message: Option<String>,

    /// The stack trace of a failure or error, if one was captured.
    #[serde(default)]
    pub stack_trace: Option<String>,

    /// Captured standard output.
    #[serde(default)]
    pub stdout: Bytes,

    /// Captured standard error.
    #[serde(default)]
    pub stderr: Bytes,
}

impl ReportEntry {
    /// Creates a summary entry for the scope with this qualified name.
    pub fn scope(scope_name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            scope_name: scope_name.into(),
            scope_display_name: None,
            test_name: None,
            test_display_name: None,
            status: ReportStatus::Success,
            elapsed,
            message: None,
            stack_trace: None,
            stdout: Bytes::new(),
            stderr: Bytes::new(),
        }
    }

    /// Creates an entry for a single test within a scope.
    pub fn test(
        scope_name: impl Into<String>,
        test_name: impl Into<String>,
        status: ReportStatus,
        elapsed: Duration,
    ) -> Self {
        Self {
            test_name: Some(test_name.into()),
            status,
            ..Self::scope(scope_name, elapsed)
        }
    }

    /// Sets the human-readable scope name.
    pub fn with_scope_display_name(mut self, name: impl Into<String>) -> Self {
        self.scope_display_name = Some(name.into());
        self
    }

    /// Sets the human-readable test name.
    pub fn with_test_display_name(mut self, name: impl Into<String>) -> Self {
        self.test_display_name = Some(name.into());
        self
    }

    /// Sets the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the stack trace.
    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    /// Sets the captured standard output.
    pub fn with_stdout(mut self, stdout: impl Into<Bytes>) -> Self {
        self.stdout = stdout.into();
        self
    }

    /// Sets the captured standard error.
    pub fn with_stderr(mut self, stderr: impl Into<Bytes>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Returns the name of the scope as shown to users.
    pub fn scope_report_name(&self) -> &str {
        self.scope_display_name
            .as_deref()
            .unwrap_or(&self.scope_name)
    }

    /// Returns the name of the test as shown to users.
    ///
    /// Falls back to the test name, then to the scope name.
    pub fn report_name(&self) -> &str {
        self.test_display_name
            .as_deref()
            .or(self.test_name.as_deref())
            .unwrap_or_else(|| self.scope_report_name())
    }

    /// Returns the report name with its package portion abbreviated.
    pub(crate) fn abbreviated_name(&self) -> Cow<'_, str> {
        abbreviate_name(self.report_name())
    }

    /// Returns the message if it has any non-whitespace content.
    pub(crate) fn non_blank_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// Returns the stack trace if it has any non-whitespace content.
    pub(crate) fn non_blank_stack_trace(&self) -> Option<&str> {
        self.stack_trace
            .as_deref()
            .filter(|trace| !trace.trim().is_empty())
    }
}

/// What happened as a result of a [`ReportEvent`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Emission {
    /// The event was recorded but nothing was printed: the scope's family is still waiting for
    /// other scopes to complete.
    Buffered {
        /// The family the scope belongs to.
        family: SmolStr,
    },

    /// The scope's family became complete and was printed.
    Rendered {
        /// The family that was printed.
        family: SmolStr,

        /// Statistics for the printed family.
        stats: FamilyStats,
    },

    /// The event was ignored: it carried a malformed scope name, or it completed a family that
    /// had already been printed.
    Ignored,
}

/// Statistics about a printed family of scopes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FamilyStats {
    /// The number of scopes that reported a summary.
    pub scopes: usize,

    /// The number of tests run, including skipped tests.
    pub tests: usize,

    /// The number of tests that passed.
    pub passed: usize,

    /// The number of tests that failed an assertion.
    pub failed: usize,

    /// The number of tests that raised an error.
    pub errored: usize,

    /// The number of tests that were skipped.
    pub skipped: usize,

    /// Time taken by the top-level scope.
    pub elapsed: Duration,
}

impl FamilyStats {
    /// Computes statistics for a family's top-level node and everything below it.
    pub fn from_family(family: &Node) -> Self {
        let mut stats = Self {
            elapsed: family
                .class_summary()
                .map_or(Duration::ZERO, |summary| summary.elapsed),
            ..Self::default()
        };
        stats.add_node(family);
        stats
    }

    fn add_node(&mut self, node: &Node) {
        if node.class_summary().is_some() {
            self.scopes += 1;
        }
        for entry in node.entries() {
            self.tests += 1;
            match entry.status {
                ReportStatus::Success => self.passed += 1,
                ReportStatus::Failure => self.failed += 1,
                ReportStatus::Error => self.errored += 1,
                ReportStatus::Skipped => self.skipped += 1,
            }
        }
        for child in node.children() {
            self.add_node(child);
        }
    }

    /// Adds another family's statistics to these.
    pub fn merge(&mut self, other: &Self) {
        self.scopes += other.scopes;
        self.tests += other.tests;
        self.passed += other.passed;
        self.failed += other.failed;
        self.errored += other.errored;
        self.skipped += other.skipped;
        self.elapsed += other.elapsed;
    }

    /// Returns true if any test failed or errored.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errored > 0
    }
}
