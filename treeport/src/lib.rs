// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Replays a stream of nested test events and prints the results as a tree.
//!
//! The event log is a file of JSON lines, one event per line:
//!
//! ```text
//! {"event": "scope-starting", "qualified-name": "org.example.OuterTest$Inner"}
//! {"event": "scope-completed", "class-summary": {"scope-name": "org.example.OuterTest$Inner", "elapsed": "12ms"}, "members": [...]}
//! ```
//!
//! Run `treeport replay <EVENTS>` to print every family of scopes as it completes.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod exit_codes;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
pub use exit_codes::TreeportExitCode;
#[doc(hidden)]
pub use output::{OutputContext, StderrStyles};
