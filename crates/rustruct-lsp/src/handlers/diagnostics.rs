//! Conversion of pipeline diagnostics into LSP diagnostics.
//!
//! Diagnostics are grouped by the source file they point into, so problems
//! inside an `!include`d file can be published against that file's own URI
//! and the editor highlights the right place.

use std::collections::HashMap;

use lsp_types::{Diagnostic, DiagnosticSeverity, Position, Range};
use rustruct_core::Severity;

/// Convert one pipeline diagnostic into an LSP diagnostic with a zero-width
/// range at the token location.
pub fn to_lsp_diagnostic(diagnostic: &rustruct_core::Diagnostic) -> Diagnostic {
    let position = Position::new(diagnostic.location.line, diagnostic.location.column);
    Diagnostic {
        range: Range {
            start: position,
            end: position,
        },
        severity: Some(match diagnostic.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
        }),
        code: None,
        source: Some("rustruct".to_string()),
        message: diagnostic.message.clone(),
        related_information: None,
        tags: None,
        code_description: None,
        data: None,
    }
}

/// Group pipeline diagnostics by the path of the file they point into.
pub fn group_by_source(
    diagnostics: &[rustruct_core::Diagnostic],
) -> HashMap<String, Vec<Diagnostic>> {
    let mut grouped: HashMap<String, Vec<Diagnostic>> = HashMap::new();
    for diagnostic in diagnostics {
        grouped
            .entry(diagnostic.location.source.clone())
            .or_default()
            .push(to_lsp_diagnostic(diagnostic));
    }
    grouped
}
