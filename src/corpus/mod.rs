//! Corpus provider seam.
//!
//! The host owns the documents, their block metadata and the active editor.
//! Everything in the core talks to the host through [`CorpusProvider`].

use serde::Serialize;

use crate::error::Result;

pub mod memory;
pub mod vault;

pub use memory::MemoryCorpus;
pub use vault::{EditorTarget, VaultCorpus};

/// Handle to one document in the corpus.
///
/// `path` is the host's full path for the document (vault-relative,
/// `/`-separated for the filesystem vault).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Document {
    pub path: String,
}

impl Document {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// File name without directories and without its extension.
    pub fn basename(&self) -> &str {
        let name = self.path.rsplit('/').next().unwrap_or(&self.path);
        match name.rfind('.') {
            Some(dot) if dot > 0 => &name[..dot],
            _ => name,
        }
    }
}

/// Byte span of a block inside its document's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockSpan {
    pub start: usize,
    pub end: usize,
}

impl BlockSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Everything the core needs from the host application.
///
/// Block positions are precomputed by the host; the core only slices text
/// with them. Enumeration order of documents and of block ids within a
/// document must be stable for an unchanged corpus.
pub trait CorpusProvider {
    fn list_documents(&self) -> Vec<Document>;

    /// Block ids of `doc` with their spans, in the host's enumeration order.
    /// Empty when the document has no blocks.
    fn block_positions(&self, doc: &Document) -> Vec<(String, BlockSpan)>;

    fn read_text(&self, doc: &Document) -> Result<String>;

    fn navigate_to(&mut self, doc: &Document) -> Result<()>;

    /// Replace the active editor's selection. Fails with
    /// [`crate::BlockrefError::NoActiveEditor`] when nothing is open.
    fn replace_selection(&mut self, text: &str) -> Result<()>;

    /// Current selection of the active editor; empty when nothing is selected
    /// or no editor is open.
    fn selection(&self) -> String;

    fn basename<'a>(&self, doc: &'a Document) -> &'a str {
        doc.basename()
    }

    fn path<'a>(&self, doc: &'a Document) -> &'a str {
        &doc.path
    }
}
