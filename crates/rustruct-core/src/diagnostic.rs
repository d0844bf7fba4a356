//! Diagnostics accumulated across the pipeline stages.

use crate::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How severe a diagnostic is.
///
/// Parse-stage structural complaints are errors; semantic shape complaints
/// are warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// The input is structurally broken.
    Error,
    /// The input parses but its shape is off.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A severity-tagged message with a source location, published to the
/// editor so it can surface squiggles and problem-list entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Where the problem is.
    pub location: Location,
}

impl Diagnostic {
    /// Create an error diagnostic.
    #[must_use]
    pub fn error(message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }

    /// Create a warning diagnostic.
    #[must_use]
    pub fn warning(message: impl Into<String>, location: Location) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.severity, self.message, self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let location = Location::new("test.dsl", 1, 2);
        let error = Diagnostic::error("Expected EOF, got }", location.clone());
        assert_eq!(error.severity, Severity::Error);
        let warning = Diagnostic::warning("File must contain a workspace", location);
        assert_eq!(warning.severity, Severity::Warning);
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::error("Expected EOF, got }", Location::new("a.dsl", 1, 0));
        assert_eq!(diagnostic.to_string(), "error: Expected EOF, got } at a.dsl:1:0");
    }
}
