// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! Settings are resolved in the following order (highest priority first):
//!
//! 1. Command-line arguments (e.g. `--theme=ascii`), applied by the caller.
//! 2. The config file passed in as a [`ConfigLocation`].
//! 3. Built-in defaults, embedded from `default-config.toml`.
//!
//! A config file looks like:
//!
//! ```toml
//! theme = "unicode"
//! hide-successes = true
//!
//! [stdout]
//! on-success = true
//! ```
//!
//! Unknown keys are ignored with a warning.

mod elements;
mod imp;

pub use elements::*;
pub use imp::*;
