// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for treeport: rendering the results of a hierarchical test run as a tree.
//!
//! Test-execution engines report scopes (test classes, and nested scopes within them) as they
//! start and complete, frequently out of hierarchical order and from several threads at once. The
//! [`TreeReporter`](reporter::TreeReporter) in this crate:
//!
//! 1. builds a [`Tree`](tree::Tree) of scopes from their qualified names (see [`names`]),
//! 2. buffers every scope of a nested *family* until the whole family has completed, and
//! 3. renders the completed family as indented lines with connector glyphs, exactly once.

pub mod config;
pub mod errors;
pub mod names;
pub mod reporter;
pub mod tree;
