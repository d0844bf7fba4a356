//! Document formatting handler.
//!
//! Formats by brace depth alone: every non-empty line is trimmed and
//! re-indented with four spaces per open block. Blank lines are left
//! untouched.

use lsp_types::{DocumentFormattingParams, Position, Range, TextEdit};

/// Indentation unit.
const INDENT: &str = "    ";

/// Handle a document formatting request against the stored text.
pub fn handle_formatting(
    _params: &DocumentFormattingParams,
    source: &str,
) -> Option<Vec<TextEdit>> {
    let mut edits = Vec::new();
    let mut depth: usize = 0;

    for (line_number, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('}') {
            depth = depth.saturating_sub(1);
        }
        let formatted = format!("{}{}", INDENT.repeat(depth), trimmed);
        if trimmed.ends_with('{') {
            depth += 1;
        }

        if formatted != line {
            edits.push(TextEdit {
                range: Range {
                    start: Position::new(line_number as u32, 0),
                    end: Position::new(line_number as u32, line.chars().count() as u32),
                },
                new_text: formatted,
            });
        }
    }

    if edits.is_empty() { None } else { Some(edits) }
}
