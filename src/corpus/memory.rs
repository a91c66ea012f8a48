//! In-memory corpus for tests and for embedding the core in other hosts.

use std::collections::HashSet;

use super::{BlockSpan, CorpusProvider, Document};
use crate::error::{BlockrefError, Result};

#[derive(Debug, Clone)]
struct MemoryDocument {
    document: Document,
    text: String,
    blocks: Vec<(String, BlockSpan)>,
}

/// Editor state held by [`MemoryCorpus`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryEditor {
    pub selection: String,
    pub replacements: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCorpus {
    documents: Vec<MemoryDocument>,
    unreadable: HashSet<String>,
    editor: Option<MemoryEditor>,
    navigations: Vec<Document>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with explicit block spans.
    #[must_use]
    pub fn with_document(
        mut self,
        path: &str,
        text: &str,
        blocks: Vec<(String, BlockSpan)>,
    ) -> Self {
        self.documents.push(MemoryDocument {
            document: Document::new(path),
            text: text.to_string(),
            blocks,
        });
        self
    }

    /// Add a document made of paragraphs, one block per `(id, content)` pair.
    ///
    /// Paragraphs are separated by a blank line and each span covers the
    /// paragraph exactly, so the extracted content equals `content`.
    #[must_use]
    pub fn with_blocks(self, path: &str, blocks: &[(&str, &str)]) -> Self {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(blocks.len());
        for (id, content) in blocks {
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            let start = text.len();
            text.push_str(content);
            spans.push(((*id).to_string(), BlockSpan::new(start, text.len())));
        }
        text.push('\n');
        self.with_document(path, &text, spans)
    }

    /// Make `read_text` fail for `path`, as if the file vanished after
    /// enumeration.
    #[must_use]
    pub fn with_unreadable(mut self, path: &str) -> Self {
        self.unreadable.insert(path.to_string());
        self
    }

    /// Open an editor with the given selection.
    #[must_use]
    pub fn with_editor(mut self, selection: &str) -> Self {
        self.editor = Some(MemoryEditor {
            selection: selection.to_string(),
            replacements: Vec::new(),
        });
        self
    }

    pub const fn editor(&self) -> Option<&MemoryEditor> {
        self.editor.as_ref()
    }

    pub fn navigations(&self) -> &[Document] {
        &self.navigations
    }
}

impl CorpusProvider for MemoryCorpus {
    fn list_documents(&self) -> Vec<Document> {
        self.documents.iter().map(|d| d.document.clone()).collect()
    }

    fn block_positions(&self, doc: &Document) -> Vec<(String, BlockSpan)> {
        self.documents
            .iter()
            .find(|d| d.document == *doc)
            .map(|d| d.blocks.clone())
            .unwrap_or_default()
    }

    fn read_text(&self, doc: &Document) -> Result<String> {
        if self.unreadable.contains(&doc.path) {
            return Err(BlockrefError::DocumentUnavailable {
                path: doc.path.clone(),
                reason: "marked unreadable".to_string(),
            });
        }
        self.documents
            .iter()
            .find(|d| d.document == *doc)
            .map(|d| d.text.clone())
            .ok_or_else(|| BlockrefError::DocumentUnavailable {
                path: doc.path.clone(),
                reason: "not in corpus".to_string(),
            })
    }

    fn navigate_to(&mut self, doc: &Document) -> Result<()> {
        self.navigations.push(doc.clone());
        Ok(())
    }

    fn replace_selection(&mut self, text: &str) -> Result<()> {
        let editor = self.editor.as_mut().ok_or(BlockrefError::NoActiveEditor)?;
        editor.replacements.push(text.to_string());
        editor.selection.clear();
        Ok(())
    }

    fn selection(&self) -> String {
        self.editor
            .as_ref()
            .map(|e| e.selection.clone())
            .unwrap_or_default()
    }
}
