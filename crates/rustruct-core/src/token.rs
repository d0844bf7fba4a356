//! Tokens produced by the lexer and re-tagged by the semantic analyser.

use crate::Location;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token types produced by the lexer, plus the semantic-only kinds the
/// analyser assigns to string attributes to drive inlay hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// A bare word, including `!`-prefixed directives like `!include`.
    Keyword,
    /// A quoted string literal (content excludes the quotes).
    String,
    /// An explicit newline.
    Newline,
    /// Opening brace `{`.
    BraceOpen,
    /// Closing brace `}`.
    BraceClose,
    /// Assignment operator `=`.
    Equal,
    /// Relationship arrow `->`.
    Relation,
    /// A single-line (`//`, `#`) or multi-line (`/* */`) comment.
    Comment,
    /// End of the merged token stream, emitted exactly once.
    Eof,
    /// Semantic: a string playing the role of an element name.
    Name,
    /// Semantic: a string playing the role of a description.
    Description,
    /// Semantic: a string holding a tag list.
    Tags,
    /// Semantic: the value of a property entry.
    Value,
}

impl TokenKind {
    /// The wire name of this kind, used in inlay-hint labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::String => "string",
            Self::Newline => "newline",
            Self::BraceOpen => "{",
            Self::BraceClose => "}",
            Self::Equal => "=",
            Self::Relation => "->",
            Self::Comment => "comment",
            Self::Eof => "EOF",
            Self::Name => "name",
            Self::Description => "description",
            Self::Tags => "tags",
            Self::Value => "value",
        }
    }

    /// Whether this kind is assigned by the analyser rather than the lexer.
    #[must_use]
    pub const fn is_semantic(self) -> bool {
        matches!(self, Self::Name | Self::Description | Self::Tags | Self::Value)
    }

    /// Whether this kind started out as a string literal. Retagged kinds
    /// stay in this bucket so re-analysing a tree selects the same tokens.
    #[must_use]
    pub const fn is_string_like(self) -> bool {
        matches!(
            self,
            Self::String | Self::Name | Self::Description | Self::Tags | Self::Value
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token with its absolute source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The kind of the token.
    pub kind: TokenKind,
    /// The textual content. Strings exclude their quotes; escapes are
    /// already resolved.
    pub content: String,
    /// Where the token starts.
    pub location: Location,
    /// Only meaningful on [`TokenKind::String`]: whether the closing quote
    /// was seen.
    pub terminated: bool,
}

impl Token {
    /// Create a new token. `terminated` starts out false.
    #[must_use]
    pub fn new(kind: TokenKind, content: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            content: content.into(),
            location,
            terminated: false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.content),
            TokenKind::Newline => write!(f, "\\n"),
            _ => f.write_str(&self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(TokenKind::Keyword.as_str(), "keyword");
        assert_eq!(TokenKind::BraceOpen.as_str(), "{");
        assert_eq!(TokenKind::Relation.as_str(), "->");
        assert_eq!(TokenKind::Name.to_string(), "name");
    }

    #[test]
    fn test_semantic_kinds() {
        assert!(TokenKind::Name.is_semantic());
        assert!(TokenKind::Value.is_semantic());
        assert!(!TokenKind::String.is_semantic());
        assert!(!TokenKind::Keyword.is_semantic());
    }

    #[test]
    fn test_string_bucket_includes_retagged_kinds() {
        assert!(TokenKind::String.is_string_like());
        assert!(TokenKind::Description.is_string_like());
        assert!(!TokenKind::Keyword.is_string_like());
    }

    #[test]
    fn test_display() {
        let location = Location::new("test.dsl", 0, 0);
        let string = Token::new(TokenKind::String, "name", location.clone());
        assert_eq!(string.to_string(), "\"name\"");
        let keyword = Token::new(TokenKind::Keyword, "workspace", location);
        assert_eq!(keyword.to_string(), "workspace");
    }
}
