//! Source location tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position inside a source file, tracked per token.
///
/// `line` and `column` are 0-based, counted in characters. `source` is the
/// path of the file the token came from; tokens spliced in from an included
/// file carry the included file's path, not the includer's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Path of the file this location points into.
    pub source: String,
    /// Line number (0-based).
    pub line: u32,
    /// Column number (0-based).
    pub column: u32,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub fn new(source: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            source: source.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let location = Location::new("workspace.dsl", 2, 7);
        assert_eq!(location.to_string(), "workspace.dsl:2:7");
    }
}
