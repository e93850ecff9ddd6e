// Copyright (c) The treeport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ThemeParseError;
use serde::Deserialize;
use std::{fmt, str::FromStr};

/// The set of glyphs used to draw the tree.
#[derive(Copy, Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    /// Use [`Unicode`](Self::Unicode) if standard error supports it, otherwise
    /// [`Ascii`](Self::Ascii).
    #[default]
    Auto,

    /// Box-drawing characters and check marks.
    Unicode,

    /// Plain ASCII characters only.
    Ascii,
}

impl Theme {
    /// Returns the string representations of all known themes.
    pub fn variants() -> &'static [&'static str] {
        &["auto", "unicode", "ascii"]
    }

    /// Returns true if this theme draws with Unicode glyphs.
    ///
    /// For [`Auto`](Self::Auto), this checks whether standard error supports Unicode.
    pub fn use_unicode(self) -> bool {
        match self {
            Self::Auto => supports_unicode::on(supports_unicode::Stream::Stderr),
            Self::Unicode => true,
            Self::Ascii => false,
        }
    }
}

impl FromStr for Theme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "unicode" => Ok(Self::Unicode),
            "ascii" => Ok(Self::Ascii),
            other => Err(ThemeParseError::new(other)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Unicode => write!(f, "unicode"),
            Self::Ascii => write!(f, "ascii"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct ThemeCharacters {
    pub(crate) blank: &'static str,
    pub(crate) vertical: &'static str,
    pub(crate) tee: &'static str,
    pub(crate) corner: &'static str,
    pub(crate) branch_down: &'static str,
    pub(crate) leaf: &'static str,
    pub(crate) success: &'static str,
    pub(crate) failure: &'static str,
    pub(crate) skipped: &'static str,
    pub(crate) details: &'static str,
}

impl Default for ThemeCharacters {
    fn default() -> Self {
        Self {
            blank: "   ",
            vertical: "|  ",
            tee: "+- ",
            corner: "'- ",
            branch_down: "+ ",
            leaf: "- ",
            success: "[OK] ",
            failure: "[XX] ",
            skipped: "[--] ",
            details: ">> ",
        }
    }
}

impl ThemeCharacters {
    pub(crate) fn for_theme(theme: Theme) -> Self {
        let mut characters = Self::default();
        if theme.use_unicode() {
            characters.use_unicode();
        }
        characters
    }

    pub(crate) fn use_unicode(&mut self) {
        self.vertical = "│  ";
        self.tee = "├─ ";
        self.corner = "└─ ";
        self.branch_down = "┬ ";
        self.leaf = "─ ";
        self.success = "✔ ";
        self.failure = "✘ ";
        self.skipped = "↷ ";
        self.details = "» ";
    }
}
