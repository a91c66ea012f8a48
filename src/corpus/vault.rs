//! Filesystem vault acting as the host application.
//!
//! A vault is a directory of markdown notes. Opening it plays the role of the
//! host's metadata cache: every note is scanned once for `^block-id` anchors
//! and the block spans are kept. Note text is read again at extraction time.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use super::{BlockSpan, CorpusProvider, Document};
use crate::error::{BlockrefError, Result};

static TRAILING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)\^([A-Za-z0-9-]+)\s*$").expect("valid block id regex"));

static STANDALONE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\^([A-Za-z0-9-]+)\s*$").expect("valid block id regex"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}#{1,6}(?:\s|$)").expect("valid heading regex"));

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s").expect("valid list item regex"));

/// The note and byte range the active editor has selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorTarget {
    pub note: String,
    pub range: Range<usize>,
}

impl EditorTarget {
    /// Parse `START..END` or a bare `START` (empty selection) into a byte range.
    pub fn parse_range(value: &str) -> Result<Range<usize>> {
        let parse = |part: &str| {
            part.trim().parse::<usize>().map_err(|err| {
                BlockrefError::InvalidSelection(format!("invalid offset {part:?}: {err}"))
            })
        };
        let range = match value.split_once("..") {
            Some((start, end)) => parse(start)?..parse(end)?,
            None => {
                let at = parse(value)?;
                at..at
            }
        };
        if range.start > range.end {
            return Err(BlockrefError::InvalidSelection(format!(
                "range start {} is after end {}",
                range.start, range.end
            )));
        }
        Ok(range)
    }
}

#[derive(Debug, Clone)]
struct ScannedNote {
    document: Document,
    blocks: Vec<(String, BlockSpan)>,
}

#[derive(Debug)]
pub struct VaultCorpus {
    root: PathBuf,
    notes: Vec<ScannedNote>,
    editor: Option<EditorTarget>,
    launch: bool,
    navigations: Vec<Document>,
}

impl VaultCorpus {
    /// Enumerate and scan every markdown note under `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(BlockrefError::VaultNotFound(root.to_path_buf()));
        }

        let mut notes = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(target: "vault", error = %err, "skipping unreadable vault entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            let Some(relative) = relative_path(root, entry.path()) else {
                continue;
            };
            match std::fs::read_to_string(entry.path()) {
                Ok(text) => notes.push(ScannedNote {
                    document: Document::new(relative),
                    blocks: scan_blocks(&text),
                }),
                Err(err) => {
                    debug!(target: "vault", path = %relative, error = %err, "skipping unreadable note");
                }
            }
        }
        notes.sort_by(|a, b| a.document.path.cmp(&b.document.path));

        let blocks: usize = notes.iter().map(|n| n.blocks.len()).sum();
        info!(target: "vault", root = %root.display(), notes = notes.len(), blocks, "vault scanned");

        Ok(Self {
            root: root.to_path_buf(),
            notes,
            editor: None,
            launch: false,
            navigations: Vec::new(),
        })
    }

    /// Open `note` in the editor with `range` selected. Without a range the
    /// cursor sits at the end of the note.
    pub fn with_editor(mut self, note: &str, range: Option<Range<usize>>) -> Result<Self> {
        let note = note.replace('\\', "/");
        let text = std::fs::read_to_string(self.root.join(&note)).map_err(|err| {
            BlockrefError::InvalidSelection(format!("cannot open {note}: {err}"))
        })?;
        let range = range.unwrap_or(text.len()..text.len());
        check_range(&text, &range)?;
        self.editor = Some(EditorTarget { note, range });
        Ok(self)
    }

    /// Also open navigated notes with the system handler.
    #[must_use]
    pub const fn with_launch(mut self, launch: bool) -> Self {
        self.launch = launch;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn editor(&self) -> Option<&EditorTarget> {
        self.editor.as_ref()
    }

    pub fn navigations(&self) -> &[Document] {
        &self.navigations
    }
}

impl CorpusProvider for VaultCorpus {
    fn list_documents(&self) -> Vec<Document> {
        self.notes.iter().map(|n| n.document.clone()).collect()
    }

    fn block_positions(&self, doc: &Document) -> Vec<(String, BlockSpan)> {
        self.notes
            .iter()
            .find(|n| n.document == *doc)
            .map(|n| n.blocks.clone())
            .unwrap_or_default()
    }

    fn read_text(&self, doc: &Document) -> Result<String> {
        std::fs::read_to_string(self.root.join(&doc.path)).map_err(|err| {
            BlockrefError::DocumentUnavailable {
                path: doc.path.clone(),
                reason: err.to_string(),
            }
        })
    }

    fn navigate_to(&mut self, doc: &Document) -> Result<()> {
        info!(target: "vault", path = %doc.path, "navigating to note");
        if self.launch {
            open::that(self.root.join(&doc.path))?;
        }
        self.navigations.push(doc.clone());
        Ok(())
    }

    fn replace_selection(&mut self, text: &str) -> Result<()> {
        let editor = self.editor.as_mut().ok_or(BlockrefError::NoActiveEditor)?;
        let path = self.root.join(&editor.note);
        let mut content = std::fs::read_to_string(&path)?;
        check_range(&content, &editor.range)?;
        content.replace_range(editor.range.clone(), text);

        let dir = path.parent().unwrap_or(self.root.as_path());
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, content.as_bytes())?;
        tmp.persist(&path).map_err(|err| BlockrefError::Io(err.error))?;

        let cursor = editor.range.start + text.len();
        editor.range = cursor..cursor;
        debug!(target: "vault", note = %editor.note, bytes = text.len(), "selection replaced");
        Ok(())
    }

    fn selection(&self) -> String {
        let Some(editor) = &self.editor else {
            return String::new();
        };
        match std::fs::read_to_string(self.root.join(&editor.note)) {
            Ok(text) => text.get(editor.range.clone()).unwrap_or_default().to_string(),
            Err(err) => {
                debug!(target: "vault", note = %editor.note, error = %err, "selection unavailable");
                String::new()
            }
        }
    }
}

/// Find `^block-id` anchored blocks in a markdown note.
///
/// A block is a paragraph or a single list item; its id is the `^id` token
/// ending its last line, or a `^id` line below it with at most blank lines
/// in between (the form used for tables and quotes). ATX headings are
/// single-line blocks; `#tag` lines are paragraph text. Fenced code is
/// skipped. Spans exclude line endings.
pub fn scan_blocks(text: &str) -> Vec<(String, BlockSpan)> {
    let mut blocks = Vec::new();
    let mut paragraph: Option<Paragraph> = None;
    // Last paragraph closed by a blank line without an id of its own.
    let mut unanchored: Option<Paragraph> = None;
    let mut in_fence = false;
    let mut offset = 0;

    for raw in text.split_inclusive('\n') {
        let line_start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);
        let line_end = line_start + line.len();
        let trimmed = line.trim_start();

        if trimmed.is_empty() && !in_fence {
            if let Some(open) = paragraph.take() {
                if !flush_paragraph(text, &mut blocks, open) {
                    unanchored = Some(open);
                }
            }
            continue;
        }
        let pending = unanchored.take();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            if let Some(open) = paragraph.take() {
                flush_paragraph(text, &mut blocks, open);
            }
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = STANDALONE_ID.captures(line) {
            if let Some(open) = paragraph.take().or(pending) {
                push_block(&mut blocks, &caps[1], open.start, open.end);
            }
            continue;
        }
        if HEADING.is_match(line) {
            if let Some(open) = paragraph.take() {
                flush_paragraph(text, &mut blocks, open);
            }
            let heading = Paragraph {
                start: line_start,
                end: line_end,
                last_line: line_start,
            };
            flush_paragraph(text, &mut blocks, heading);
            continue;
        }
        if LIST_ITEM.is_match(line) {
            if let Some(open) = paragraph.take() {
                flush_paragraph(text, &mut blocks, open);
            }
        }
        paragraph = Some(match paragraph {
            Some(open) => Paragraph {
                end: line_end,
                last_line: line_start,
                ..open
            },
            None => Paragraph {
                start: line_start,
                end: line_end,
                last_line: line_start,
            },
        });
    }
    if let Some(open) = paragraph {
        flush_paragraph(text, &mut blocks, open);
    }
    blocks
}

#[derive(Debug, Clone, Copy)]
struct Paragraph {
    start: usize,
    end: usize,
    last_line: usize,
}

/// Emit `paragraph` if its last line ends in an id. Returns whether it did.
fn flush_paragraph(text: &str, blocks: &mut Vec<(String, BlockSpan)>, paragraph: Paragraph) -> bool {
    let Some(caps) = TRAILING_ID.captures(&text[paragraph.last_line..paragraph.end]) else {
        return false;
    };
    push_block(blocks, &caps[1], paragraph.start, paragraph.end);
    true
}

fn push_block(blocks: &mut Vec<(String, BlockSpan)>, id: &str, start: usize, end: usize) {
    if blocks.iter().any(|(existing, _)| existing == id) {
        debug!(target: "vault", id, "duplicate block id ignored");
        return;
    }
    blocks.push((id.to_string(), BlockSpan::new(start, end)));
}

fn check_range(text: &str, range: &Range<usize>) -> Result<()> {
    if text.get(range.clone()).is_none() {
        return Err(BlockrefError::InvalidSelection(format!(
            "range {}..{} does not fit a {}-byte note on character boundaries",
            range.start,
            range.end,
            text.len()
        )));
    }
    Ok(())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}
