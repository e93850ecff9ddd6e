// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The displayer for human-friendly tree output.

mod formatters;
mod imp;
mod theme;

pub(crate) use imp::*;
pub use theme::Theme;
