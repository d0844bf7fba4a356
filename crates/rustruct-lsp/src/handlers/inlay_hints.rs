//! Inlay hints handler.
//!
//! A straight walk over the analysed tree: every token the semantic
//! analyser tagged as a name, description or value gets a label at its
//! position, so plain strings like `"Payment Service"` read as
//! `name: "Payment Service"` in the editor.

use lsp_types::{InlayHint, InlayHintKind, InlayHintLabel, InlayHintParams, Position, Range};
use rustruct_core::{Token, TokenKind};
use rustruct_parser::Node;

/// Handle an inlay hint request against the cached AST.
pub fn handle_inlay_hints(params: &InlayHintParams, ast: &Node) -> Option<Vec<InlayHint>> {
    let mut hints = Vec::new();
    collect(ast, &params.range, &mut hints);
    if hints.is_empty() { None } else { Some(hints) }
}

fn collect(node: &Node, range: &Range, hints: &mut Vec<InlayHint>) {
    push_hint(&node.token, range, hints);
    for attribute in &node.attributes {
        push_hint(attribute, range, hints);
    }
    for child in &node.children {
        collect(child, range, hints);
    }
}

fn push_hint(token: &Token, range: &Range, hints: &mut Vec<InlayHint>) {
    if !matches!(
        token.kind,
        TokenKind::Name | TokenKind::Description | TokenKind::Value
    ) {
        return;
    }
    if token.location.line < range.start.line || token.location.line > range.end.line {
        return;
    }
    hints.push(InlayHint {
        position: Position::new(token.location.line, token.location.column),
        label: InlayHintLabel::String(format!("{}: ", token.kind)),
        kind: Some(InlayHintKind::PARAMETER),
        text_edits: None,
        tooltip: None,
        padding_left: None,
        padding_right: None,
        data: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustruct_parser::{analyse, FakeIncluder};

    fn params(start_line: u32, end_line: u32) -> InlayHintParams {
        InlayHintParams {
            text_document: lsp_types::TextDocumentIdentifier {
                uri: "file:///test.dsl".parse().unwrap(),
            },
            range: Range {
                start: Position::new(start_line, 0),
                end: Position::new(end_line, 0),
            },
            work_done_progress_params: Default::default(),
        }
    }

    fn labels(hints: &[InlayHint]) -> Vec<&str> {
        hints
            .iter()
            .map(|h| match &h.label {
                InlayHintLabel::String(s) => s.as_str(),
                InlayHintLabel::LabelParts(_) => "",
            })
            .collect()
    }

    #[test]
    fn test_workspace_attributes_get_hints() {
        let analysis = analyse(
            "/test.dsl",
            "workspace \"name\" \"description\" {\nmodel {\n}\nviews {\n}\n}",
            &FakeIncluder::new(),
        );
        let hints = handle_inlay_hints(&params(0, 10), &analysis.ast).unwrap();
        assert_eq!(labels(&hints), vec!["name: ", "description: "]);
        assert_eq!(hints[0].position, Position::new(0, 10));
        assert_eq!(hints[1].position, Position::new(0, 17));
    }

    #[test]
    fn test_property_entries_get_name_and_value_hints() {
        let analysis = analyse(
            "/test.dsl",
            "workspace {\nmodel {\n}\nviews {\nproperties {\n\"key\" \"value\"\n}\n}\n}",
            &FakeIncluder::new(),
        );
        let hints = handle_inlay_hints(&params(0, 10), &analysis.ast).unwrap();
        assert_eq!(labels(&hints), vec!["name: ", "value: "]);
        assert_eq!(hints[0].position.line, 5);
    }

    #[test]
    fn test_hints_outside_range_are_dropped() {
        let analysis = analyse(
            "/test.dsl",
            "workspace \"name\" {\nmodel {\nperson \"User\"\n}\nviews {\n}\n}",
            &FakeIncluder::new(),
        );
        let hints = handle_inlay_hints(&params(2, 3), &analysis.ast).unwrap();
        assert_eq!(labels(&hints), vec!["name: "]);
        assert_eq!(hints[0].position.line, 2);
    }

    #[test]
    fn test_no_hints_yields_none() {
        let analysis = analyse("/test.dsl", "workspace {\n}", &FakeIncluder::new());
        assert!(handle_inlay_hints(&params(0, 5), &analysis.ast).is_none());
    }
}
