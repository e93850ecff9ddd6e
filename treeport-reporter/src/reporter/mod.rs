// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report the results of a hierarchical test run as a tree.
//!
//! The main type here is [`TreeReporter`], which is constructed via a [`TreeReporterBuilder`].

mod aggregator;
mod displayer;
mod events;
mod helpers;
mod imp;
mod sink;

pub use displayer::Theme;
pub use events::*;
pub use imp::*;
pub use sink::*;
