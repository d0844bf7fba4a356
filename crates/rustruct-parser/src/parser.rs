//! Line-and-brace parser for the Structurizr DSL token stream.
//!
//! The grammar is line-oriented: each line contributes at most one node
//! (plus a synthetic assignment when a `=` appears), trailing tokens become
//! attributes, and brace tokens open and close child subtrees. The parser
//! never aborts; structural problems become error diagnostics and the tree
//! stays navigable.

use rustruct_core::{Diagnostic, Location, Token, TokenKind};

use crate::ast::{Node, NodeType};

/// Parse a token stream into an AST.
///
/// Always returns a `root` node whose children are the top-level
/// declarations, in input order.
pub fn parse(tokens: Vec<Token>) -> (Node, Vec<Diagnostic>) {
    Parser::new(tokens).run()
}

/// Arena node; `parent` exists for closing-brace recovery only and is
/// dropped when the tree is built.
struct RawNode {
    token: Token,
    node_type: NodeType,
    attributes: Vec<Token>,
    children: Vec<usize>,
    parent: Option<usize>,
}

enum LineOutcome {
    /// The line ended at a newline or the end of the stream.
    Done,
    /// The line ended at a closing brace; the enclosing block is done.
    Closed,
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    arena: Vec<RawNode>,
    diagnostics: Vec<Diagnostic>,
    last_attached: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            arena: Vec::new(),
            diagnostics: Vec::new(),
            last_attached: 0,
        }
    }

    fn run(mut self) -> (Node, Vec<Diagnostic>) {
        let source = self
            .tokens
            .first()
            .map(|t| t.location.source.clone())
            .unwrap_or_default();
        self.arena.push(RawNode {
            token: Token::new(TokenKind::Keyword, "root", Location::new(source, 0, 0)),
            node_type: NodeType::Root,
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
        });
        let root = 0;

        loop {
            match self.peek_kind() {
                None | Some(TokenKind::Eof) => break,
                Some(TokenKind::Newline | TokenKind::Comment) => self.advance(),
                Some(TokenKind::BraceClose) => {
                    let token = self.next_token();
                    self.close_brace(root, token, true);
                }
                Some(_) => {
                    self.parse_line(root);
                }
            }
        }

        let tree = self.build(root);
        (tree, self.diagnostics)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.position).map(|t| t.kind)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn next_token(&mut self) -> Token {
        let token = self.tokens[self.position].clone();
        self.position += 1;
        token
    }

    fn attach(&mut self, parent: usize, token: Token, node_type: NodeType) -> usize {
        let id = self.arena.len();
        self.arena.push(RawNode {
            token,
            node_type,
            attributes: Vec::new(),
            children: Vec::new(),
            parent: Some(parent),
        });
        self.arena[parent].children.push(id);
        self.last_attached = id;
        id
    }

    fn reparent(&mut self, node: usize, new_parent: usize) {
        if let Some(old) = self.arena[node].parent {
            self.arena[old].children.retain(|&c| c != node);
        }
        self.arena[new_parent].children.push(node);
        self.arena[node].parent = Some(new_parent);
    }

    fn error(&mut self, message: &str, location: Location) {
        self.diagnostics.push(Diagnostic::error(message, location));
    }

    /// Parse one line under `parent`. The caller has already skipped
    /// newlines and comments, so the next token starts the line.
    fn parse_line(&mut self, parent: usize) -> LineOutcome {
        let mut line_parent = parent;
        let mut current: Option<usize> = None;
        loop {
            let Some(kind) = self.peek_kind() else {
                return LineOutcome::Done;
            };
            match kind {
                TokenKind::Eof => return LineOutcome::Done,
                TokenKind::Newline => {
                    self.advance();
                    return LineOutcome::Done;
                }
                TokenKind::Comment => self.advance(),
                TokenKind::Equal => {
                    let token = self.next_token();
                    self.handle_equal(token, &mut line_parent, &mut current);
                }
                TokenKind::BraceOpen => {
                    let token = self.next_token();
                    let Some(owner) = current else {
                        self.error(
                            "Opening curly brace symbols ({) must be on the same line.",
                            token.location,
                        );
                        self.skip_line();
                        return LineOutcome::Done;
                    };
                    self.attach(owner, token, NodeType::BraceOpen);
                    self.parse_block(owner);
                    return LineOutcome::Done;
                }
                TokenKind::BraceClose => {
                    let token = self.next_token();
                    let from = current.unwrap_or(line_parent);
                    self.close_brace(from, token, false);
                    return LineOutcome::Closed;
                }
                TokenKind::Keyword => {
                    let token = self.next_token();
                    let starts_node = current.is_none()
                        || self.arena[line_parent].node_type == NodeType::Assignment;
                    if starts_node {
                        current = Some(self.attach(line_parent, token, NodeType::Keyword));
                    } else if let Some(node) = current {
                        self.arena[node].attributes.push(token);
                    }
                }
                TokenKind::String => {
                    let token = self.next_token();
                    match current {
                        None => current = Some(self.attach(line_parent, token, NodeType::String)),
                        Some(node) => self.arena[node].attributes.push(token),
                    }
                }
                _ => {
                    // Relations (and retagged kinds, should they ever come
                    // back through) ride along as attributes.
                    let token = self.next_token();
                    if let Some(node) = current {
                        self.arena[node].attributes.push(token);
                    }
                }
            }
        }
    }

    /// A `=` restructures the line into an assignment: the token to its
    /// left becomes the assignment's first child and the rest of the line
    /// continues underneath it.
    fn handle_equal(&mut self, token: Token, line_parent: &mut usize, current: &mut Option<usize>) {
        if self.arena[*line_parent].node_type == NodeType::Assignment {
            if let Some(node) = *current {
                self.arena[node].attributes.push(token);
            }
            return;
        }
        let assignment = self.attach(*line_parent, token, NodeType::Assignment);
        if let Some(node) = current.take() {
            if let Some(attribute) = self.arena[node].attributes.pop() {
                // `!include file.dsl a = …`: the trailing attribute is the
                // left-hand side, the earlier node stays a sibling.
                let node_type = if attribute.kind == TokenKind::String {
                    NodeType::String
                } else {
                    NodeType::Keyword
                };
                self.attach(assignment, attribute, node_type);
            } else {
                self.reparent(node, assignment);
            }
        }
        *line_parent = assignment;
    }

    /// Parse the lines of a brace block owned by `owner` until its closing
    /// brace is attached or the stream runs out.
    fn parse_block(&mut self, owner: usize) {
        // The opening brace was just consumed, so anything before the next
        // newline still sits on the brace's line.
        let mut at_line_start = false;
        loop {
            let Some(kind) = self.peek_kind() else {
                self.unexpected_eof();
                return;
            };
            match kind {
                TokenKind::Eof => {
                    self.unexpected_eof();
                    return;
                }
                TokenKind::Newline => {
                    self.advance();
                    at_line_start = true;
                }
                TokenKind::Comment => self.advance(),
                TokenKind::BraceClose => {
                    let token = self.next_token();
                    self.close_brace(owner, token, at_line_start);
                    return;
                }
                _ => {
                    if matches!(self.parse_line(owner), LineOutcome::Closed) {
                        return;
                    }
                    at_line_start = true;
                }
            }
        }
    }

    /// Attach a closing brace to the nearest ancestor-or-self of `from`
    /// that has an open-brace child; with no such ancestor the brace is
    /// spurious.
    fn close_brace(&mut self, from: usize, token: Token, at_line_start: bool) {
        let own_line = at_line_start
            && matches!(
                self.peek_kind(),
                None | Some(TokenKind::Newline | TokenKind::Comment | TokenKind::Eof)
            );
        if !own_line {
            self.error(
                "Closing curly brace symbols (}) must be on a line of their own.",
                token.location.clone(),
            );
        }

        let mut node = Some(from);
        while let Some(idx) = node {
            let has_open = self.arena[idx]
                .children
                .iter()
                .any(|&c| self.arena[c].node_type == NodeType::BraceOpen);
            if has_open {
                self.attach(idx, token, NodeType::BraceClose);
                return;
            }
            node = self.arena[idx].parent;
        }
        self.error("Expected EOF, got }", token.location);
    }

    fn unexpected_eof(&mut self) {
        let location = self.arena[self.last_attached].token.location.clone();
        self.error("Unexpected EOF, expected }", location);
    }

    fn skip_line(&mut self) {
        while let Some(kind) = self.peek_kind() {
            if matches!(kind, TokenKind::Eof) {
                return;
            }
            self.advance();
            if matches!(kind, TokenKind::Newline) {
                return;
            }
        }
    }

    fn build(&mut self, idx: usize) -> Node {
        let child_ids = std::mem::take(&mut self.arena[idx].children);
        let children = child_ids.into_iter().map(|c| self.build(c)).collect();
        let raw = &mut self.arena[idx];
        Node {
            token: raw.token.clone(),
            node_type: raw.node_type,
            attributes: std::mem::take(&mut raw.attributes),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::includer::FakeIncluder;
    use crate::lexer::lex;

    fn parse_source(text: &str) -> (Node, Vec<Diagnostic>) {
        let (tokens, lex_diagnostics) = lex("test.dsl", text, &FakeIncluder::new());
        assert!(lex_diagnostics.is_empty(), "unexpected lex diagnostics");
        parse(tokens)
    }

    #[test]
    fn test_keyword_as_a_start() {
        let (_, diagnostics) = parse_source("something");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_jumps_over_comments() {
        let (ast, diagnostics) = parse_source("# comment\nsomething");
        assert!(diagnostics.is_empty());
        assert_eq!(ast.children.len(), 1);
        assert_eq!(ast.children[0].content(), "something");
    }

    #[test]
    fn test_comments_never_enter_the_tree() {
        let (ast, diagnostics) = parse_source("/* something */");
        assert!(diagnostics.is_empty());
        assert!(ast.children.is_empty());
    }

    #[test]
    fn test_unclosed_brace_reports_unexpected_eof() {
        let (_, diagnostics) = parse_source("workspace {");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Unexpected EOF, expected }");
    }

    #[test]
    fn test_closed_braces_report_nothing() {
        let (_, diagnostics) = parse_source("workspace {\n}");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_spurious_closing_brace() {
        let (_, diagnostics) = parse_source("workspace \n}");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Expected EOF, got }");
    }

    #[test]
    fn test_opening_brace_cannot_start_a_line() {
        let (_, diagnostics) = parse_source("workspace\n{\n}");
        assert!(
            diagnostics
                .iter()
                .any(|d| d.message == "Opening curly brace symbols ({) must be on the same line.")
        );
    }

    #[test]
    fn test_closing_brace_must_be_alone_on_its_line() {
        let (_, diagnostics) = parse_source("workspace {\n} trailing");
        assert!(
            diagnostics
                .iter()
                .any(|d| d.message == "Closing curly brace symbols (}) must be on a line of their own.")
        );
    }

    #[test]
    fn test_assignments_are_handled() {
        let (ast, diagnostics) = parse_source("a = workspace");
        assert!(diagnostics.is_empty());
        assert_eq!(ast.to_string(), "(root (= (a) (workspace)))");
    }

    #[test]
    fn test_string_properties_are_not_an_error() {
        let (ast, diagnostics) = parse_source("\"key\" \"value\"");
        assert!(diagnostics.is_empty());
        assert_eq!(ast.to_string(), "(root (key (value)))");
    }

    #[test]
    fn test_nested_assignments() {
        let (ast, diagnostics) = parse_source("a = workspace {\n b = component\n}");
        assert!(diagnostics.is_empty());
        assert_eq!(
            ast.to_string(),
            "(root (= (a) (workspace ({) (= (b) (component)) (}))))"
        );
    }

    #[test]
    fn test_assignment_with_attributes() {
        let (ast, diagnostics) = parse_source("a = workspace \"test\" {\n}");
        assert!(diagnostics.is_empty());
        assert_eq!(ast.to_string(), "(root (= (a) (workspace (test) ({) (}))))");
    }

    #[test]
    fn test_included_files_join_the_stream() {
        let (ast, diagnostics) = parse_source("!include file.dsl");
        assert!(diagnostics.is_empty());
        assert_eq!(
            ast.to_string(),
            "(root (!include (file.dsl)) (= (a) (workspace (test))))"
        );
    }

    #[test]
    fn test_workspace_elements_in_any_order() {
        let (ast, diagnostics) =
            parse_source("workspace \"name\" \"description\" {\n views {\n}\nmodel {\n}\n}");
        assert!(diagnostics.is_empty());
        assert_eq!(
            ast.to_string(),
            "(root (workspace (name) (description) ({) (views ({) (})) (model ({) (})) (})))"
        );
    }

    #[test]
    fn test_second_keyword_becomes_attribute() {
        let (ast, diagnostics) = parse_source(
            "workspace \"name\" \"description\" {\n !identifiers flat \n views {\n}\nmodel {\n}\n}",
        );
        assert!(diagnostics.is_empty());
        assert_eq!(
            ast.to_string(),
            "(root (workspace (name) (description) ({) (!identifiers (flat)) (views ({) (})) (model ({) (})) (})))"
        );
    }

    #[test]
    fn test_multiple_levels_of_children() {
        let (ast, diagnostics) = parse_source(
            "workspace {\n model {\nsystemContext \"context\"{\n container \"container\"{\ncomponent \"component\"\n}\n}\n}\n}",
        );
        assert!(diagnostics.is_empty());
        assert_eq!(
            ast.to_string(),
            "(root (workspace ({) (model ({) (systemContext (context) ({) (container (container) ({) (component (component)) (})) (})) (})) (})))"
        );
    }

    #[test]
    fn test_relations_ride_along_as_attributes() {
        let (ast, diagnostics) = parse_source("user -> system \"uses\"");
        assert!(diagnostics.is_empty());
        assert_eq!(ast.children.len(), 1);
        let node = &ast.children[0];
        assert_eq!(node.content(), "user");
        let kinds: Vec<TokenKind> = node.attributes.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![TokenKind::Relation, TokenKind::Keyword, TokenKind::String]
        );
    }

    #[test]
    fn test_root_children_preserve_input_order() {
        let (ast, _) = parse_source("first\nsecond\nthird");
        let contents: Vec<&str> = ast.children.iter().map(Node::content).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_attributes_never_hold_structural_tokens() {
        let (ast, _) = parse_source("workspace \"n\" {\nmodel {\n}\n}\n\"s\" \"t\"");
        fn check(node: &Node) {
            for attribute in &node.attributes {
                assert!(!matches!(
                    attribute.kind,
                    TokenKind::Newline | TokenKind::BraceOpen | TokenKind::BraceClose | TokenKind::Eof
                ));
            }
            node.children.iter().for_each(check);
        }
        check(&ast);
    }

    #[test]
    fn test_empty_input_yields_empty_root() {
        let (ast, diagnostics) = parse_source("");
        assert!(diagnostics.is_empty());
        assert_eq!(ast.node_type, NodeType::Root);
        assert!(ast.children.is_empty());
    }

    #[test]
    fn test_unexpected_eof_located_at_last_child() {
        let (_, diagnostics) = parse_source("workspace {");
        assert_eq!(diagnostics[0].location.line, 0);
        assert_eq!(diagnostics[0].location.column, 10);
    }
}
