//! Layered configuration and the settings store.
//!
//! Defaults are patched by the global config file, then the vault's own
//! config file (or a single explicit file), then `BLOCKREF_*` environment
//! variables. A patch only overrides the keys it names.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BlockrefError, Result};

/// Placeholder replaced by the built link in [`InsertConfig::format`].
pub const LINK_PLACEHOLDER: &str = "{link}";
pub const DEFAULT_FORMAT: &str = "!{link}";
pub const DEFAULT_LIMIT: usize = 10;
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 50;

/// Environment variables read over the file layers.
pub const ENV_OVERRIDES: &[&str] = &[
    "BLOCKREF_INSERT_FORMAT",
    "BLOCKREF_INSERT_KEEP_TEXT",
    "BLOCKREF_DISPLAY_PARSE_LINKS",
    "BLOCKREF_DISPLAY_REMOVE_ID",
    "BLOCKREF_DISPLAY_FILE_NAME",
    "BLOCKREF_SEARCH_SELECTED_TEXT",
    "BLOCKREF_SEARCH_LIMIT",
    "BLOCKREF_SEARCH_CONTENT",
    "BLOCKREF_SEARCH_PATH",
    "BLOCKREF_SEARCH_ID",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub insert: InsertConfig,
    pub display: DisplayConfig,
    pub search: SearchConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, vault_root: &Path) -> Result<Self> {
        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("BLOCKREF_CONFIG").ok().map(PathBuf::from));
        Self::load_layers(
            explicit.as_deref(),
            global_config_path().as_deref(),
            vault_root,
            |key| std::env::var(key).ok(),
        )
    }

    /// [`Config::load`] with the global file and environment passed in.
    ///
    /// An explicit file replaces both file layers; otherwise the global file
    /// is patched by the vault file. `lookup` supplies the overrides.
    pub fn load_layers(
        explicit: Option<&Path>,
        global: Option<&Path>,
        vault_root: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        let vault = vault_config_path(vault_root);
        let layers: Vec<&Path> = match explicit {
            Some(path) => vec![path],
            None => global.into_iter().chain([vault.as_path()]).collect(),
        };
        for path in layers {
            if let Some(patch) = Self::load_patch(path)? {
                config.merge_patch(patch);
            }
        }

        config.apply_overrides(lookup)?;
        config.search.limit = clamp_limit(config.search.limit);

        Ok(config)
    }

    /// Parse a config file body; keys it omits keep their defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| BlockrefError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.search.limit = clamp_limit(config.search.limit);
        Ok(config)
    }

    /// One file over defaults, without other layers or overrides. A missing
    /// file gives the defaults.
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        if let Some(patch) = Self::load_patch(path)? {
            config.merge_patch(patch);
        }
        config.search.limit = clamp_limit(config.search.limit);
        Ok(config)
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| BlockrefError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| BlockrefError::Config(format!("parse config {}: {err}", path.display())))?;
        debug!(path = %path.display(), "config layer loaded");
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.insert {
            self.insert.merge(patch);
        }
        if let Some(patch) = patch.display {
            self.display.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let flag = |key: &str| lookup(key).map(|value| parse_bool(&value));

        if let Some(value) = lookup("BLOCKREF_INSERT_FORMAT") {
            self.insert.format = value;
        }
        if let Some(value) = flag("BLOCKREF_INSERT_KEEP_TEXT") {
            self.insert.keep_text = value;
        }

        if let Some(value) = flag("BLOCKREF_DISPLAY_PARSE_LINKS") {
            self.display.parse_links = value;
        }
        if let Some(value) = flag("BLOCKREF_DISPLAY_REMOVE_ID") {
            self.display.remove_id_from_content = value;
        }
        if let Some(value) = lookup("BLOCKREF_DISPLAY_FILE_NAME") {
            self.display.file_name = value.parse()?;
        }

        if let Some(value) = flag("BLOCKREF_SEARCH_SELECTED_TEXT") {
            self.search.selected_text_as_search = value;
        }
        if let Some(value) = lookup("BLOCKREF_SEARCH_LIMIT") {
            self.search.limit = parse_limit("BLOCKREF_SEARCH_LIMIT", &value)?;
        }
        if let Some(value) = flag("BLOCKREF_SEARCH_CONTENT") {
            self.search.fields.content = value;
        }
        if let Some(value) = flag("BLOCKREF_SEARCH_PATH") {
            self.search.fields.path = value;
        }
        if let Some(value) = flag("BLOCKREF_SEARCH_ID") {
            self.search.fields.id = value;
        }

        Ok(())
    }

    /// Copy with invalid values replaced: a format without `{link}` falls
    /// back to the default and the limit is clamped to 1–50.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        if !out.insert.format.contains(LINK_PLACEHOLDER) {
            out.insert.format = DEFAULT_FORMAT.to_string();
        }
        out.search.limit = clamp_limit(out.search.limit);
        out
    }

    /// Sanitize and write to `path`, returning what was written.
    pub fn save(&self, path: &Path) -> Result<Self> {
        let sanitized = self.sanitized();
        let raw = toml::to_string_pretty(&sanitized)
            .map_err(|err| BlockrefError::Serialization(format!("serialize config: {err}")))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, raw)
            .map_err(|err| BlockrefError::Config(format!("write config {}: {err}", path.display())))?;
        debug!(path = %path.display(), "config saved");
        Ok(sanitized)
    }

    /// Set one value by dotted key, e.g. `search.fields.id` or `insert.format`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let flag = || parse_strict_bool(key, value);
        match key {
            "insert.format" => self.insert.format = value.to_string(),
            "insert.keep_text" => self.insert.keep_text = flag()?,
            "display.parse_links" => self.display.parse_links = flag()?,
            "display.remove_id_from_content" => self.display.remove_id_from_content = flag()?,
            "display.file_name" => self.display.file_name = value.parse()?,
            "search.selected_text_as_search" => self.search.selected_text_as_search = flag()?,
            "search.limit" => self.search.limit = parse_limit(key, value)?,
            "search.fields.content" => self.search.fields.content = flag()?,
            "search.fields.path" => self.search.fields.path = flag()?,
            "search.fields.id" => self.search.fields.id = flag()?,
            _ => {
                return Err(BlockrefError::Config(format!(
                    "unknown config key {key} (expected one of: {})",
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Keys accepted by [`Config::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "insert.format",
    "insert.keep_text",
    "display.parse_links",
    "display.remove_id_from_content",
    "display.file_name",
    "search.selected_text_as_search",
    "search.limit",
    "search.fields.content",
    "search.fields.path",
    "search.fields.id",
];

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("blockref/config.toml"))
}

pub fn vault_config_path(vault_root: &Path) -> PathBuf {
    vault_root.join(".blockref/config.toml")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertConfig {
    /// Insertion template; `{link}` is replaced by the built link.
    pub format: String,
    /// Use the current selection as the link alias.
    pub keep_text: bool,
}

impl Default for InsertConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            keep_text: false,
        }
    }
}

impl InsertConfig {
    fn merge(&mut self, patch: InsertPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
        if let Some(value) = patch.keep_text {
            self.keep_text = value;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub parse_links: bool,
    pub remove_id_from_content: bool,
    pub file_name: FileNameDisplay,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            parse_links: true,
            remove_id_from_content: true,
            file_name: FileNameDisplay::Base,
        }
    }
}

impl DisplayConfig {
    fn merge(&mut self, patch: DisplayPatch) {
        if let Some(value) = patch.parse_links {
            self.parse_links = value;
        }
        if let Some(value) = patch.remove_id_from_content {
            self.remove_id_from_content = value;
        }
        if let Some(value) = patch.file_name {
            self.file_name = value;
        }
    }
}

/// How the source document is labelled in results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileNameDisplay {
    #[default]
    Base,
    Path,
}

impl FromStr for FileNameDisplay {
    type Err = BlockrefError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "path" => Ok(Self::Path),
            _ => Err(BlockrefError::Config(format!(
                "invalid file name display {value} (expected base|path)"
            ))),
        }
    }
}

impl fmt::Display for FileNameDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::Path => f.write_str("path"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Seed the query with the editor selection when a session starts.
    pub selected_text_as_search: bool,
    pub limit: usize,
    pub fields: SearchFields,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            selected_text_as_search: false,
            limit: DEFAULT_LIMIT,
            fields: SearchFields::default(),
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.selected_text_as_search {
            self.selected_text_as_search = value;
        }
        if let Some(value) = patch.limit {
            self.limit = value;
        }
        if let Some(patch) = patch.fields {
            if let Some(value) = patch.content {
                self.fields.content = value;
            }
            if let Some(value) = patch.path {
                self.fields.path = value;
            }
            if let Some(value) = patch.id {
                self.fields.id = value;
            }
        }
    }
}

/// Which record fields make up the fuzzy-searchable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFields {
    pub content: bool,
    pub path: bool,
    pub id: bool,
}

impl Default for SearchFields {
    fn default() -> Self {
        Self {
            content: true,
            path: true,
            id: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub insert: Option<InsertPatch>,
    pub display: Option<DisplayPatch>,
    pub search: Option<SearchPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct InsertPatch {
    pub format: Option<String>,
    pub keep_text: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DisplayPatch {
    pub parse_links: Option<bool>,
    pub remove_id_from_content: Option<bool>,
    pub file_name: Option<FileNameDisplay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub selected_text_as_search: Option<bool>,
    pub limit: Option<usize>,
    pub fields: Option<SearchFieldsPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchFieldsPatch {
    pub content: Option<bool>,
    pub path: Option<bool>,
    pub id: Option<bool>,
}

pub const fn clamp_limit(limit: usize) -> usize {
    if limit < MIN_LIMIT {
        MIN_LIMIT
    } else if limit > MAX_LIMIT {
        MAX_LIMIT
    } else {
        limit
    }
}

fn parse_limit(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map(clamp_limit)
        .map_err(|err| BlockrefError::Config(format!("invalid {key} value {value}: {err}")))
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_strict_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(BlockrefError::Config(format!(
            "invalid {key} value {value} (expected true|false)"
        ))),
    }
}
