// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Display helpers for elapsed times.

use std::{fmt, time::Duration};

pub(super) struct DisplayElapsed(pub(super) Duration);

impl fmt::Display for DisplayElapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // .3 means print three digits after the decimal point.
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}
