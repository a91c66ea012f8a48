//! Per-session candidate index.

use crate::config::SearchFields;
use crate::extract::BlockRecord;

/// A block record with the text the fuzzy ranker matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchableRecord {
    pub record: BlockRecord,
    pub search_text: String,
}

/// Concatenate the enabled fields in the fixed order content, path, id.
pub fn search_text(record: &BlockRecord, fields: SearchFields) -> String {
    let mut text = String::new();
    if fields.content {
        text.push_str(&record.content);
    }
    if fields.path {
        text.push_str(&record.document.path);
    }
    if fields.id {
        text.push_str(&record.id);
    }
    text
}

/// Wrap every record with its search text. Must be rebuilt whenever the
/// field flags change.
pub fn build_index(records: Vec<BlockRecord>, fields: SearchFields) -> Vec<SearchableRecord> {
    records
        .into_iter()
        .map(|record| {
            let search_text = search_text(&record, fields);
            SearchableRecord {
                record,
                search_text,
            }
        })
        .collect()
}
