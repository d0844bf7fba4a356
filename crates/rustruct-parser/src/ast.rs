//! The generic AST produced by the parser.
//!
//! The tree is deliberately untyped: nodes are labelled by the token that
//! seeded them and the semantic analyser gives them meaning afterwards.
//! Ownership runs strictly downward; the parent links the parser needs for
//! closing-brace recovery live in its internal arena and never escape.

use rustruct_core::{Location, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// The unique synthetic root of a parse.
    Root,
    /// A line led by a keyword.
    Keyword,
    /// A line led by a string literal.
    String,
    /// A synthetic `name = element` node seeded by the `=` token.
    Assignment,
    /// An opening brace attached to the node it opens.
    BraceOpen,
    /// A closing brace attached to the node it closes.
    BraceClose,
}

impl NodeType {
    /// Short label for this node type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Keyword => "keyword",
            Self::String => "string",
            Self::Assignment => "assignment",
            Self::BraceOpen => "{",
            Self::BraceClose => "}",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// The token that seeded this node (synthetic for `root` and brace-less
    /// assignments).
    pub token: Token,
    /// The structural role of the node.
    pub node_type: NodeType,
    /// Tokens attached inline to this node: the strings and trailing
    /// keywords following a line-leading token. Never contains `Newline`,
    /// brace, or `Eof` tokens.
    pub attributes: Vec<Token>,
    /// Nested nodes; a brace block opens a child subtree.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node seeded by `token`.
    #[must_use]
    pub fn new(token: Token, node_type: NodeType) -> Self {
        Self {
            token,
            node_type,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create the synthetic root node for `source`.
    #[must_use]
    pub fn root(source: &str) -> Self {
        let token = Token::new(TokenKind::Keyword, "root", Location::new(source, 0, 0));
        Self::new(token, NodeType::Root)
    }

    /// The content of the seed token.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.token.content
    }

    /// Whether any direct child is an opening brace.
    #[must_use]
    pub fn has_open_brace(&self) -> bool {
        self.children.iter().any(|c| c.node_type == NodeType::BraceOpen)
    }
}

/// Render the tree as an s-expression: the seed content, then each
/// attribute in parentheses, then each child, all space-separated.
/// `a = workspace "test" {\n}` renders as
/// `(root (= (a) (workspace (test) ({) (}))))`.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.token.content)?;
        for attribute in &self.attributes {
            write!(f, " ({})", attribute.content)?;
        }
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(content: &str, kind: TokenKind) -> Token {
        Token::new(kind, content, Location::new("test.dsl", 0, 0))
    }

    #[test]
    fn test_root_node() {
        let root = Node::root("test.dsl");
        assert_eq!(root.content(), "root");
        assert_eq!(root.node_type, NodeType::Root);
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_display_renders_attributes_and_children() {
        let mut root = Node::root("test.dsl");
        let mut workspace = Node::new(token("workspace", TokenKind::Keyword), NodeType::Keyword);
        workspace.attributes.push(token("name", TokenKind::String));
        workspace
            .children
            .push(Node::new(token("{", TokenKind::BraceOpen), NodeType::BraceOpen));
        workspace
            .children
            .push(Node::new(token("}", TokenKind::BraceClose), NodeType::BraceClose));
        root.children.push(workspace);

        assert_eq!(root.to_string(), "(root (workspace (name) ({) (})))");
    }

    #[test]
    fn test_has_open_brace() {
        let mut node = Node::new(token("model", TokenKind::Keyword), NodeType::Keyword);
        assert!(!node.has_open_brace());
        node.children
            .push(Node::new(token("{", TokenKind::BraceOpen), NodeType::BraceOpen));
        assert!(node.has_open_brace());
    }
}
