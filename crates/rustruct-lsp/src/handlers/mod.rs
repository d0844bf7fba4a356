//! LSP request and notification handlers.
//!
//! Each handler is a pure function from request parameters and cached
//! pipeline state to protocol values; the main loop owns all I/O.

pub mod diagnostics;
pub mod formatting;
pub mod inlay_hints;
