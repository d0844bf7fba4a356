//! Character-level lexer for the Structurizr DSL.
//!
//! The lexer consumes source text one character at a time and yields a flat
//! token stream with absolute source locations. `!include` directives are
//! resolved against the including file's directory and the included file's
//! tokens are spliced into the stream at the point of the directive, each
//! carrying the included file's own path.
//!
//! The lexer never fails: malformed input yields best-effort tokens and
//! include problems surface as error diagnostics.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rustruct_core::{Diagnostic, Location, Token, TokenKind};

use crate::includer::Includer;

/// Tokenise `text`, splicing in included files via `includer`.
///
/// `source` is the path lexed tokens are attributed to and the base for
/// resolving relative `!include` paths. The final token is always a single
/// [`TokenKind::Eof`].
pub fn lex(source: &str, text: &str, includer: &dyn Includer) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut visited = HashSet::new();
    visited.insert(PathBuf::from(source));
    lex_inner(source, text, includer, &mut visited)
}

fn lex_inner(
    source: &str,
    text: &str,
    includer: &dyn Includer,
    visited: &mut HashSet<PathBuf>,
) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut scanner = Scanner::new(source);
    for ch in text.chars() {
        scanner.push(ch);
    }
    let (tokens, end) = scanner.finish();

    let mut diagnostics = Vec::new();
    let mut tokens = splice_includes(tokens, source, includer, visited, &mut diagnostics);
    tokens.push(Token::new(TokenKind::Eof, "", end));
    (tokens, diagnostics)
}

/// Lexer states. `Start` doubles as the between-tokens state.
enum State {
    Start,
    Keyword,
    Str,
    SingleLineComment,
    MultiLineComment,
}

struct Scanner {
    source: String,
    state: State,
    current: Option<Token>,
    escaped: bool,
    tokens: Vec<Token>,
    line: u32,
    column: u32,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            state: State::Start,
            current: None,
            escaped: false,
            tokens: Vec::new(),
            line: 0,
            column: 0,
        }
    }

    fn here(&self) -> Location {
        Location::new(self.source.clone(), self.line, self.column)
    }

    fn push(&mut self, ch: char) {
        match self.state {
            State::Start => {
                if ch == '"' {
                    self.state = State::Str;
                    self.current = Some(Token::new(TokenKind::String, "", self.here()));
                } else if ch == '/' || ch == '#' {
                    self.state = State::SingleLineComment;
                    self.current = Some(Token::new(TokenKind::Comment, ch, self.here()));
                } else if !ch.is_whitespace() {
                    self.state = State::Keyword;
                    self.current = Some(Token::new(TokenKind::Keyword, ch, self.here()));
                }
            }
            State::Keyword => {
                if ch.is_whitespace() {
                    self.finish_keyword();
                } else if let Some(token) = &mut self.current {
                    token.content.push(ch);
                }
            }
            State::Str => {
                if self.escaped {
                    self.escaped = false;
                    if let Some(token) = &mut self.current {
                        token.content.push(ch);
                    }
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == '"' || ch == '\n' {
                    if let Some(mut token) = self.current.take() {
                        token.terminated = ch == '"';
                        self.tokens.push(token);
                    }
                    self.state = State::Start;
                } else if let Some(token) = &mut self.current {
                    token.content.push(ch);
                }
            }
            State::SingleLineComment => {
                if ch == '\n' {
                    if let Some(token) = self.current.take() {
                        self.tokens.push(token);
                    }
                    self.state = State::Start;
                } else if let Some(token) = &mut self.current {
                    token.content.push(ch);
                    if token.content == "/*" {
                        self.state = State::MultiLineComment;
                    }
                }
            }
            State::MultiLineComment => {
                let closed = match &mut self.current {
                    Some(token) => {
                        token.content.push(ch);
                        token.content.ends_with("*/")
                    }
                    None => false,
                };
                if closed {
                    if let Some(token) = self.current.take() {
                        self.tokens.push(token);
                    }
                    self.state = State::Start;
                }
            }
        }

        // Newlines inside a multi-line comment neither produce a token nor
        // advance the line counter.
        if ch == '\n' && !matches!(self.state, State::MultiLineComment) {
            let token = Token::new(TokenKind::Newline, "\n", self.here());
            self.tokens.push(token);
            self.column = 0;
            self.line += 1;
        } else {
            self.column += 1;
        }
    }

    fn finish_keyword(&mut self) {
        if let Some(mut token) = self.current.take() {
            categorize(&mut token);
            self.tokens.push(token);
        }
        self.state = State::Start;
    }

    fn finish(mut self) -> (Vec<Token>, Location) {
        if let Some(mut token) = self.current.take() {
            if token.kind == TokenKind::Keyword {
                categorize(&mut token);
            }
            self.tokens.push(token);
        }
        let end = Location::new(self.source, self.line, self.column);
        (self.tokens, end)
    }
}

/// Re-tag a finalised keyword whose content is one of the fixed symbols.
/// Everything else, including `!`-prefixed directives, stays a keyword.
fn categorize(token: &mut Token) {
    token.kind = match token.content.as_str() {
        "{" => TokenKind::BraceOpen,
        "}" => TokenKind::BraceClose,
        "=" => TokenKind::Equal,
        "->" => TokenKind::Relation,
        _ => return,
    };
}

/// Splice included files into the stream right after each `!include <path>`
/// pair. The directive and path tokens are retained; the included tokens
/// come in minus their trailing `Eof`. A path already on the include stack
/// is a cycle and splices nothing.
fn splice_includes(
    tokens: Vec<Token>,
    source: &str,
    includer: &dyn Includer,
    visited: &mut HashSet<PathBuf>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        let is_include = token.kind == TokenKind::Keyword && token.content == "!include";
        result.push(token);
        if !is_include {
            continue;
        }
        let Some(path_token) = iter.next() else {
            break;
        };
        let resolved = resolve(source, &path_token.content);
        let location = path_token.location.clone();
        result.push(path_token);

        if !visited.insert(resolved.clone()) {
            diagnostics.push(Diagnostic::error(
                format!("Include cycle detected: {}", resolved.display()),
                location,
            ));
            continue;
        }
        match includer.include(&resolved) {
            Ok(content) => {
                let inner_source = resolved.to_string_lossy();
                let (mut inner, inner_diags) =
                    lex_inner(&inner_source, &content, includer, visited);
                inner.pop();
                result.extend(inner);
                diagnostics.extend(inner_diags);
            }
            Err(err) => {
                tracing::debug!("include failed: {err}");
                diagnostics.push(Diagnostic::error(err.to_string(), location));
            }
        }
        visited.remove(&resolved);
    }
    result
}

/// Resolve an include path against the including file's directory.
/// Absolute paths pass through unchanged.
fn resolve(source: &str, included: &str) -> PathBuf {
    Path::new(source)
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(included)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::includer::FakeIncluder;

    fn lex_fixture(text: &str) -> (Vec<Token>, Vec<Diagnostic>) {
        lex("test.dsl", text, &FakeIncluder::new())
    }

    /// Tokens without the trailing Eof.
    fn tokens_of(text: &str) -> Vec<Token> {
        let (mut tokens, _) = lex_fixture(text);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        tokens.pop();
        tokens
    }

    #[test]
    fn test_empty_input_yields_only_eof() {
        let (tokens, diagnostics) = lex_fixture("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_keyword() {
        let tokens = tokens_of("workspace");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].content, "workspace");
    }

    #[test]
    fn test_multiple_tokens() {
        let tokens = tokens_of("workspace declaration");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].content, "declaration");
    }

    #[test]
    fn test_multiline_emits_newline_token() {
        let tokens = tokens_of("workspace\ndeclaration");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[1].content, "\n");
    }

    #[test]
    fn test_token_position() {
        let tokens = tokens_of("workspace declaration");
        assert_eq!(tokens[1].location.line, 0);
        assert_eq!(tokens[1].location.column, 10);
    }

    #[test]
    fn test_position_advances_across_lines() {
        let tokens = tokens_of("workspace\ndeclaration");
        assert_eq!(tokens[2].location.line, 1);
        assert_eq!(tokens[2].location.column, 0);
    }

    #[test]
    fn test_newline_position_is_pre_increment() {
        let tokens = tokens_of("ab\nc");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[1].location.line, 0);
        assert_eq!(tokens[1].location.column, 2);
    }

    #[test]
    fn test_braces_and_symbols() {
        let tokens = tokens_of("{ } = ->");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::BraceOpen,
                TokenKind::BraceClose,
                TokenKind::Equal,
                TokenKind::Relation
            ]
        );
    }

    #[test]
    fn test_continue_after_symbols() {
        let tokens = tokens_of("identifier = component");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].kind, TokenKind::Equal);
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].content, "component");
    }

    #[test]
    fn test_one_character_keywords() {
        let tokens = tokens_of("a = b");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].content, "a");
        assert_eq!(tokens[2].content, "b");
    }

    #[test]
    fn test_exclamation_mark_still_keyword() {
        let tokens = tokens_of("!docs docs");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[0].content, "!docs");
    }

    #[test]
    fn test_terminated_string() {
        let tokens = tokens_of("\"name\"");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].content, "name");
        assert!(tokens[0].terminated);
    }

    #[test]
    fn test_unterminated_string_at_eof() {
        let tokens = tokens_of("\"name");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].content, "name");
        assert!(!tokens[0].terminated);
    }

    #[test]
    fn test_string_closed_by_newline_is_unterminated() {
        let tokens = tokens_of("\"name\nnext");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert!(!tokens[0].terminated);
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].content, "next");
    }

    #[test]
    fn test_escaped_string() {
        let tokens = tokens_of(r#""name with \"another string\"""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].content, "name with \"another string\"");
        assert!(tokens[0].terminated);
    }

    #[test]
    fn test_single_line_comment() {
        let tokens = tokens_of("// comment");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].content, "// comment");
    }

    #[test]
    fn test_hash_comment() {
        let tokens = tokens_of("# comment\nworkspace");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].content, "# comment");
        assert_eq!(tokens[2].content, "workspace");
    }

    #[test]
    fn test_multi_line_comment_swallows_newlines() {
        let tokens = tokens_of("/* one\ntwo */ workspace");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].content, "/* one\ntwo */");
        let newlines = tokens.iter().filter(|t| t.kind == TokenKind::Newline).count();
        assert_eq!(newlines, 0);
        assert_eq!(tokens[1].content, "workspace");
    }

    #[test]
    fn test_include_splices_tokens() {
        let tokens = tokens_of("!include test.dsl");
        let contents: Vec<&str> = tokens.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["!include", "test.dsl", "user", "Person"]);
        assert_eq!(tokens[2].location.source, "test.dsl");
        assert_eq!(tokens[2].location.line, 0);
    }

    #[test]
    fn test_include_resolves_against_including_directory() {
        let (tokens, diagnostics) = lex("/work/ws/main.dsl", "!include test.dsl", &FakeIncluder::new());
        assert!(diagnostics.is_empty());
        assert_eq!(tokens[2].location.source, "/work/ws/test.dsl");
    }

    #[test]
    fn test_include_of_unknown_path_reports_and_splices_nothing() {
        let (tokens, diagnostics) = lex_fixture("!include missing.dsl");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing.dsl"));
        let contents: Vec<&str> = tokens.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["!include", "missing.dsl", ""]);
    }

    #[test]
    fn test_include_cycle_detected() {
        let mut includer = FakeIncluder::new();
        includer.insert("self.dsl", "!include self.dsl");
        let (_, diagnostics) = lex("self.dsl", "!include self.dsl", &includer);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("Include cycle detected"));
    }

    #[test]
    fn test_diamond_includes_are_not_cycles() {
        let mut includer = FakeIncluder::new();
        includer.insert("shared.dsl", "person \"P\"");
        includer.insert("left.dsl", "!include shared.dsl");
        includer.insert("right.dsl", "!include shared.dsl");
        let (_, diagnostics) = lex(
            "main.dsl",
            "!include left.dsl\n!include right.dsl",
            &includer,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_eof_is_last_and_unique() {
        let (tokens, _) = lex_fixture("!include test.dsl\nworkspace");
        let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        assert_eq!(eofs, 1);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_every_token_carries_a_source() {
        let (tokens, _) = lex_fixture("!include test.dsl\nworkspace \"a\"");
        assert!(tokens.iter().all(|t| !t.location.source.is_empty()));
    }
}
