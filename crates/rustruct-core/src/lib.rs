//! Core types for rustruct
//!
//! This crate provides the fundamental types shared by the Structurizr DSL
//! pipeline and the language server built on top of it:
//!
//! - [`Location`] - A position inside a source file
//! - [`Token`] / [`TokenKind`] - The lexer's output vocabulary
//! - [`Diagnostic`] / [`Severity`] - Problems reported to the editor
//! - [`Workspace`] and friends - The typed model built by the semantic
//!   analyser
//!
//! # Example
//!
//! ```
//! use rustruct_core::{Diagnostic, Location, Severity};
//!
//! let location = Location::new("workspace.dsl", 3, 0);
//! let diagnostic = Diagnostic::warning("Workspace must contain a model", location);
//! assert_eq!(diagnostic.severity, Severity::Warning);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod diagnostic;
pub mod location;
pub mod token;
pub mod workspace;

pub use diagnostic::{Diagnostic, Severity};
pub use location::Location;
pub use token::{Token, TokenKind};
pub use workspace::{
    Configuration, Documentation, Element, ElementKind, ElementRef, IdentifierMode, Model, Role,
    Scope, Views, Visibility, Workspace,
};
