//! Eligibility filter for repository files.
//!
//! Files that don't match are dropped silently; that is not an error.

use std::collections::BTreeSet;
use std::path::Path;

/// Keeps file names whose extension is in a configured set.
///
/// Extensions are compared case-sensitively and without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSelector {
    extensions: BTreeSet<String>,
}

impl Default for FileSelector {
    /// Selects Go sources.
    fn default() -> Self {
        Self::with_extensions(["go"])
    }
}

impl FileSelector {
    /// Create a selector for the given extensions (`"go"` or `".go"` both work).
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Extensions this selector accepts.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    /// Returns `true` if `name` is eligible for analysis.
    #[must_use]
    pub fn is_eligible(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.extensions.contains(e))
    }

    /// Keep the eligible names, preserving their order.
    #[must_use]
    pub fn select(&self, names: Vec<String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| self.is_eligible(name))
            .collect()
    }
}
