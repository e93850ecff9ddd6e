// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use owo_colors::Style;

#[derive(Debug, Default, Clone)]
pub(super) struct Styles {
    pub(super) name: Style,
    pub(super) label: Style,
    pub(super) pass: Style,
    pub(super) fail: Style,
    pub(super) skip: Style,
}

impl Styles {
    pub(super) fn colorize(&mut self) {
        self.name = Style::new().bold();
        self.label = Style::new().bold();
        self.pass = Style::new().green().bold();
        self.fail = Style::new().red().bold();
        self.skip = Style::new().yellow().bold();
    }
}
