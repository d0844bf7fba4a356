//! Include resolution for the `!include` directive.
//!
//! The lexer resolves relative paths against the including file's directory
//! before calling into an [`Includer`]; implementations only ever see
//! already-resolved paths.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to fetch included content.
#[derive(Debug, Error)]
#[error("failed to include {path}: {source}")]
pub struct IncludeError {
    /// The path that could not be included.
    pub path: PathBuf,
    /// The underlying I/O error.
    #[source]
    pub source: io::Error,
}

impl IncludeError {
    /// Create an include error for the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Produces the textual content behind an include path.
pub trait Includer {
    /// Fetch the content of `path`.
    ///
    /// A regular file yields its contents verbatim. A directory yields the
    /// concatenation of its immediate `.dsl` files.
    fn include(&self, path: &Path) -> Result<String, IncludeError>;
}

/// Filesystem-backed includer used by the language server.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsIncluder;

impl FsIncluder {
    /// Create a new filesystem includer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Includer for FsIncluder {
    fn include(&self, path: &Path) -> Result<String, IncludeError> {
        let metadata = fs::metadata(path).map_err(|e| IncludeError::new(path, e))?;
        if metadata.is_dir() {
            read_dir_concatenated(path)
        } else {
            fs::read_to_string(path).map_err(|e| IncludeError::new(path, e))
        }
    }
}

/// Concatenate the immediate regular `.dsl` files of a directory, sorted
/// ascending by file name so the result is stable across platforms.
fn read_dir_concatenated(path: &Path) -> Result<String, IncludeError> {
    let mut names: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| IncludeError::new(path, e))? {
        let entry = entry.map_err(|e| IncludeError::new(path, e))?;
        let file_type = entry.file_type().map_err(|e| IncludeError::new(path, e))?;
        if !file_type.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(".dsl") {
            names.push(entry.path());
        }
    }
    names.sort();

    let mut content = String::new();
    for name in names {
        content.push_str(&fs::read_to_string(&name).map_err(|e| IncludeError::new(name.clone(), e))?);
    }
    Ok(content)
}

/// In-memory includer mapping a few logical names to fixed fixtures.
///
/// Test double shared by the parser and server tests; anything outside the
/// fixture set fails like a missing file would.
#[derive(Debug, Clone)]
pub struct FakeIncluder {
    files: HashMap<String, String>,
}

impl FakeIncluder {
    /// Create the standard fixture set.
    #[must_use]
    pub fn new() -> Self {
        let mut files = HashMap::new();
        files.insert("test.dsl".to_string(), "user \"Person\"".to_string());
        files.insert("file.dsl".to_string(), "a = workspace \"test\"".to_string());
        Self { files }
    }

    /// Add or replace a fixture, keyed by file name.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.files.insert(name.into(), content.into());
    }
}

impl Default for FakeIncluder {
    fn default() -> Self {
        Self::new()
    }
}

impl Includer for FakeIncluder {
    fn include(&self, path: &Path) -> Result<String, IncludeError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files.get(&name).cloned().ok_or_else(|| {
            IncludeError::new(path, io::Error::new(io::ErrorKind::NotFound, "no such fixture"))
        })
    }
}
