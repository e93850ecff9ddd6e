// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Qualified scope names and their segmentation.
//!
//! A qualified scope name such as `org.example.OuterTest$Inner$Deep` names a scope nested inside
//! other scopes. Splitting it on [`NESTED_SCOPE_DELIMITER`] yields the path from the top-level
//! scope down to the scope itself: `org.example.OuterTest`, `Inner`, `Deep`.
//!
//! Everything in this module is a pure function of its input. The tree and the aggregator only
//! ever see [`ScopePath`]s, so a different delimiter scheme only needs changes here.

use smol_str::SmolStr;
use std::{borrow::Cow, fmt};

/// The delimiter between a scope and a scope nested inside it.
pub const NESTED_SCOPE_DELIMITER: char = '$';

/// A qualified scope name split into its path segments.
///
/// A `ScopePath` always has at least one segment, and no segment is empty.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ScopePath {
    segments: Vec<SmolStr>,
}

impl ScopePath {
    /// Splits a qualified name into path segments.
    ///
    /// Returns `None` for malformed names: the empty string, or names with an empty segment such
    /// as `Outer$$Inner` or `Outer$`.
    pub fn parse(qualified_name: &str) -> Option<Self> {
        Self::from_segments(qualified_name.split(NESTED_SCOPE_DELIMITER))
    }

    /// Builds a path out of already-split segments.
    ///
    /// Returns `None` if there are no segments or if any segment is empty.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<SmolStr> = segments
            .into_iter()
            .map(|segment| SmolStr::new(segment.as_ref()))
            .collect();
        if segments.is_empty() || segments.iter().any(|segment| segment.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    /// Returns the path segments, top-level scope first.
    pub fn segments(&self) -> &[SmolStr] {
        &self.segments
    }

    /// Returns the top-level segment: the key of the family this scope belongs to.
    pub fn root(&self) -> &SmolStr {
        &self.segments[0]
    }

    /// Returns the last segment, i.e. the name of the scope itself.
    pub fn leaf(&self) -> &SmolStr {
        &self.segments[self.segments.len() - 1]
    }

    /// Returns the number of segments, which is also the depth of the scope's node in a tree.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this scope is nested inside another scope.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, "{NESTED_SCOPE_DELIMITER}")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Returns true if the qualified name refers to a nested scope.
pub fn is_nested(qualified_name: &str) -> bool {
    qualified_name.contains(NESTED_SCOPE_DELIMITER)
}

/// Abbreviates the package portion of a dotted name.
///
/// `org.example.FooTest` becomes `o.e.FooTest`. Anything from the first `(` onwards (a parameter
/// list) is kept verbatim, and names containing whitespace are treated as free-form display names
/// and returned unchanged.
pub fn abbreviate_name(name: &str) -> Cow<'_, str> {
    let (head, params) = match name.find('(') {
        Some(index) => name.split_at(index),
        None => (name, ""),
    };
    if head.chars().any(char::is_whitespace) {
        return Cow::Borrowed(name);
    }
    let Some((package, last)) = head.rsplit_once('.') else {
        return Cow::Borrowed(name);
    };

    let mut abbreviated = String::with_capacity(name.len());
    for part in package.split('.') {
        // Empty parts (e.g. `a..b`) are kept as-is.
        abbreviated.extend(part.chars().next());
        abbreviated.push('.');
    }
    abbreviated.push_str(last);
    abbreviated.push_str(params);
    Cow::Owned(abbreviated)
}
