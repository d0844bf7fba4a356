//! Structurizr DSL pipeline: includer, lexer, parser and semantic analyser.
//!
//! The pipeline turns source text into tokens (splicing in `!include`d
//! files), tokens into an error-tolerant AST, and the AST into a typed
//! [`Workspace`] model, accumulating diagnostics along the way. Every stage
//! degrades gracefully on malformed input so each keystroke in an editor
//! still yields a usable tree.
//!
//! # Example
//!
//! ```
//! use rustruct_parser::{analyse, FakeIncluder};
//!
//! let source = "workspace {\nmodel {\n}\nviews {\n}\n}";
//! let analysis = analyse("workspace.dsl", source, &FakeIncluder::new());
//! assert!(analysis.diagnostics.is_empty());
//! assert!(analysis.workspace.unwrap().model.is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analyser;
pub mod ast;
pub mod includer;
pub mod lexer;
pub mod parser;

pub use analyser::SemanticAnalyser;
pub use ast::{Node, NodeType};
pub use includer::{FakeIncluder, FsIncluder, IncludeError, Includer};
pub use lexer::lex;
pub use parser::parse;

use rustruct_core::{Diagnostic, Workspace};

/// The result of running the whole pipeline over one document.
#[derive(Debug)]
pub struct Analysis {
    /// The typed workspace model, absent when the file declares none.
    pub workspace: Option<Workspace>,
    /// The full AST, usable even when diagnostics were reported.
    pub ast: Node,
    /// Diagnostics from all stages, in lex, parse, analyse order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Run lex, parse and analyse over `text`.
///
/// `source` is the path the document and its diagnostics are attributed to
/// and the base directory for `!include` resolution. The result is a pure
/// function of the arguments; nothing is cached between invocations.
pub fn analyse(source: &str, text: &str, includer: &dyn Includer) -> Analysis {
    let (tokens, mut diagnostics) = lexer::lex(source, text, includer);
    let (mut ast, parse_diagnostics) = parser::parse(tokens);
    diagnostics.extend(parse_diagnostics);
    let (workspace, semantic_diagnostics) = SemanticAnalyser::new().analyse(&mut ast);
    diagnostics.extend(semantic_diagnostics);
    Analysis {
        workspace,
        ast,
        diagnostics,
    }
}
