//! Ranked block results and session outcomes for the terminal.
//!
//! Link segments are underlined in cyan and labels dimmed, mirroring the
//! picker. Robot mode serializes the same data instead.

use console::style;
use serde::Serialize;
use tracing::debug;

use crate::render::{DisplayBody, SegmentKind};
use crate::session::{Outcome, RenderedItem};

/// Results of one query, ready for human or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct BlockResults {
    pub query: String,
    /// Blocks in the index the query ran against.
    pub candidates: usize,
    pub count: usize,
    pub results: Vec<RenderedItem>,
}

impl BlockResults {
    pub fn new(query: impl Into<String>, candidates: usize, results: Vec<RenderedItem>) -> Self {
        Self {
            query: query.into(),
            candidates,
            count: results.len(),
            results,
        }
    }

    pub fn format_human(&self) -> String {
        debug!(target: "search", results = self.results.len(), "rendering results");
        if self.results.is_empty() {
            return self.format_empty();
        }

        let mut out = if self.query.is_empty() {
            format!("{} of {} blocks\n\n", self.count, self.candidates)
        } else {
            format!(
                "{} of {} blocks match '{}'\n\n",
                self.count, self.candidates, self.query
            )
        };
        for (i, item) in self.results.iter().enumerate() {
            out.push_str(&format!("{:>3}. {}\n", i + 1, format_body(&item.body)));
            out.push_str(&format!(
                "     {} {}\n",
                style(&item.label).dim(),
                style(format!("[{}]", item.score)).dim()
            ));
        }
        out
    }

    fn format_empty(&self) -> String {
        if self.candidates == 0 {
            return "! No ^referenced blocks in this vault\n".to_string();
        }
        format!(
            "! No blocks found for '{}'\n\nTry:\n  - Fewer or different characters\n  - Enabling more search fields (blockref config set search.fields.path true)\n",
            self.query
        )
    }
}

/// Display body with link segments styled.
pub fn format_body(body: &DisplayBody) -> String {
    body.segments
        .iter()
        .map(|segment| match segment.kind {
            SegmentKind::Text => segment.text.clone(),
            SegmentKind::Link => style(&segment.text).cyan().underlined().to_string(),
        })
        .collect()
}

pub fn format_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Opened { record } => {
            format!("Opened {} (block ^{})", record.document.path, record.id)
        }
        Outcome::Embedded { insertion, .. } => format!("Inserted {insertion}"),
        Outcome::NoEditor { insertion, .. } => format!(
            "{} no active editor, nothing inserted. Reference:\n{insertion}",
            style("!").yellow().bold()
        ),
    }
}
