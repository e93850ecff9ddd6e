// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Documented exit codes for `treeport` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum TreeportExitCode {}

impl TreeportExitCode {
    /// No errors occurred and every family was printed.
    pub const OK: i32 = 0;

    /// One or more tests failed or raised an error.
    pub const TEST_RUN_FAILED: i32 = 100;

    /// The event log ended while some families were still waiting for nested scopes.
    pub const INCOMPLETE_RUN: i32 = 106;

    /// Writing data to stdout or stderr produced an error.
    pub const WRITE_OUTPUT_ERROR: i32 = 110;

    /// A user issue happened while setting up a treeport invocation: an unreadable config file,
    /// or an event log that couldn't be read or parsed.
    pub const SETUP_ERROR: i32 = 96;
}
