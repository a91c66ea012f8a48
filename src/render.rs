//! Presentation of block records: display body, source label and the text
//! inserted by the embed action.
//!
//! Everything here is a pure function of a record and the configuration.
//! Output is renderer-agnostic; the terminal picker and the CLI printers
//! decide how a [`SegmentKind::Link`] looks.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::{Config, FileNameDisplay, LINK_PLACEHOLDER};
use crate::error::BlockrefError;
use crate::extract::BlockRecord;

/// `[label](target)`, non-nested, shortest match.
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid markdown link regex"));

/// What choosing a block does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Navigate to the block's document.
    Open,
    /// Insert a reference to the block at the editor selection.
    Embed,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Embed => f.write_str("embed"),
        }
    }
}

impl FromStr for Action {
    type Err = BlockrefError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(Self::Open),
            "embed" => Ok(Self::Embed),
            _ => Err(BlockrefError::ValidationFailed(format!(
                "invalid action {value} (expected open|embed)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Text,
    /// Label of a flattened markdown link.
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    fn text(text: &str) -> Self {
        Self {
            kind: SegmentKind::Text,
            text: text.to_string(),
        }
    }

    fn link(text: &str) -> Self {
        Self {
            kind: SegmentKind::Link,
            text: text.to_string(),
        }
    }
}

/// Display text of a block as tagged segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayBody {
    pub segments: Vec<Segment>,
}

impl DisplayBody {
    /// The body with all tagging dropped.
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Texts of the link segments, in order.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Link)
            .map(|s| s.text.as_str())
    }
}

pub fn display_body(record: &BlockRecord, config: &Config) -> DisplayBody {
    let content = if config.display.remove_id_from_content {
        strip_id(&record.content, &record.id)
    } else {
        record.content.clone()
    };

    let segments = if config.display.parse_links {
        flatten_links(&content)
    } else if content.is_empty() {
        Vec::new()
    } else {
        vec![Segment::text(&content)]
    };
    DisplayBody { segments }
}

/// Remove the first `^id` anchor and re-trim.
pub fn strip_id(content: &str, id: &str) -> String {
    let anchor = format!("^{id}");
    content.replacen(&anchor, "", 1).trim().to_string()
}

/// Replace each `[label](target)` with a link segment holding `label`.
pub fn flatten_links(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in MARKDOWN_LINK.captures_iter(text) {
        let (Some(whole), Some(label)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::text(&text[last..whole.start()]));
        }
        segments.push(Segment::link(label.as_str()));
        last = whole.end();
    }
    if last < text.len() {
        segments.push(Segment::text(&text[last..]));
    }
    segments
}

/// `{label}#^{id}`, where the label follows the file name policy.
pub fn display_label(record: &BlockRecord, config: &Config) -> String {
    let label = match config.display.file_name {
        FileNameDisplay::Base => record.document.basename(),
        FileNameDisplay::Path => record.document.path.as_str(),
    };
    format!("{label}#^{}", record.id)
}

/// `[[{basename}#^{id}]]`, or `[[{basename}#^{id}|{alias}]]`.
pub fn build_link(record: &BlockRecord, alias: Option<&str>) -> String {
    let basename = record.document.basename();
    match alias {
        Some(alias) => format!("[[{basename}#^{}|{alias}]]", record.id),
        None => format!("[[{basename}#^{}]]", record.id),
    }
}

/// Text the chosen action inserts. Opening inserts nothing.
///
/// With `keep_text` and a non-empty selection the selection becomes the link
/// alias. The first `{link}` in the format is replaced; a format without the
/// placeholder is returned unchanged.
pub fn build_insertion(
    action: Action,
    record: &BlockRecord,
    config: &Config,
    selection: &str,
) -> Option<String> {
    match action {
        Action::Open => None,
        Action::Embed => {
            let alias = (config.insert.keep_text && !selection.is_empty()).then_some(selection);
            let link = build_link(record, alias);
            Some(config.insert.format.replacen(LINK_PLACEHOLDER, &link, 1))
        }
    }
}
