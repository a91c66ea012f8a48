//! Block extraction from a corpus.

use serde::Serialize;
use tracing::debug;

use crate::corpus::{CorpusProvider, Document};

/// One addressable block: its document, its anchor id and its trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockRecord {
    pub document: Document,
    pub id: String,
    pub content: String,
}

/// Slice every block the corpus reports out of its document's text.
///
/// Records come out in document enumeration order, then block enumeration
/// order within a document. A document that cannot be read is skipped; so is
/// a block whose span does not fit the text.
pub fn extract<C: CorpusProvider + ?Sized>(corpus: &C) -> Vec<BlockRecord> {
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for document in corpus.list_documents() {
        let positions = corpus.block_positions(&document);
        if positions.is_empty() {
            continue;
        }

        let text = match corpus.read_text(&document) {
            Ok(text) => text,
            Err(err) => {
                skipped += 1;
                debug!(target: "extract", path = %document.path, error = %err, "skipping unreadable document");
                continue;
            }
        };

        for (id, span) in positions {
            let Some(slice) = text.get(span.start..span.end) else {
                debug!(
                    target: "extract",
                    path = %document.path,
                    id = %id,
                    start = span.start,
                    end = span.end,
                    "block span outside document text"
                );
                continue;
            };
            records.push(BlockRecord {
                document: document.clone(),
                id,
                content: slice.trim().to_string(),
            });
        }
    }

    debug!(target: "extract", blocks = records.len(), skipped, "extraction complete");
    records
}
