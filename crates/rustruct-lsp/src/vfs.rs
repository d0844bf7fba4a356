//! Virtual file system for open documents.
//!
//! The VFS holds the in-memory state of every open document together with
//! the cached output of the last pipeline run, so request handlers never
//! re-run the pipeline themselves.

use ropey::Rope;
use rustruct_parser::Analysis;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A document in the virtual file system.
#[derive(Debug)]
pub struct Document {
    /// The document content as a rope for efficient editing.
    content: Rope,
    /// The document version (incremented on each change).
    version: i32,
    /// Output of the last pipeline run, invalidated on change.
    analysis: Option<Arc<Analysis>>,
}

impl Document {
    /// Create a new document with the given content.
    pub fn new(content: String, version: i32) -> Self {
        Self {
            content: Rope::from_str(&content),
            version,
            analysis: None,
        }
    }

    /// Get the document content as a string.
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    /// Get the document version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// The cached pipeline output, if any.
    pub fn analysis(&self) -> Option<Arc<Analysis>> {
        self.analysis.clone()
    }

    /// Store the pipeline output for the current content.
    pub fn set_analysis(&mut self, analysis: Arc<Analysis>) {
        self.analysis = Some(analysis);
    }

    /// Update the document content.
    pub fn update(&mut self, content: String, version: i32) {
        self.content = Rope::from_str(&content);
        self.version = version;
        self.analysis = None;
    }
}

/// Virtual file system for managing open documents.
#[derive(Debug, Default)]
pub struct Vfs {
    /// Open documents indexed by path.
    documents: HashMap<PathBuf, Document>,
}

impl Vfs {
    /// Create a new empty VFS.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document in the VFS.
    pub fn open(&mut self, path: PathBuf, content: String, version: i32) {
        self.documents.insert(path, Document::new(content, version));
    }

    /// Close a document in the VFS.
    pub fn close(&mut self, path: &Path) {
        self.documents.remove(path);
    }

    /// Get a document by path.
    pub fn get(&self, path: &Path) -> Option<&Document> {
        self.documents.get(path)
    }

    /// Get document content as a string.
    pub fn get_content(&self, path: &Path) -> Option<String> {
        self.documents.get(path).map(Document::text)
    }

    /// The cached pipeline output for a document.
    pub fn get_analysis(&self, path: &Path) -> Option<Arc<Analysis>> {
        self.documents.get(path).and_then(Document::analysis)
    }

    /// Attach pipeline output to a document.
    pub fn set_analysis(&mut self, path: &Path, analysis: Arc<Analysis>) {
        if let Some(document) = self.documents.get_mut(path) {
            document.set_analysis(analysis);
        }
    }

    /// Update a document's content.
    pub fn update(&mut self, path: &Path, content: String, version: i32) {
        if let Some(document) = self.documents.get_mut(path) {
            document.update(content, version);
        }
    }

    /// Get all open document paths.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.documents.keys()
    }
}
