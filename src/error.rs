//! Error types for blockref

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlockrefError>;

#[derive(Debug, Error)]
pub enum BlockrefError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A document vanished or became unreadable between enumeration and read.
    #[error("document unavailable: {path}: {reason}")]
    DocumentUnavailable { path: String, reason: String },

    #[error("no active editor to insert into")]
    NoActiveEditor,

    #[error("no search session is active")]
    NoActiveSession,

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("vault not found: {}", .0.display())]
    VaultNotFound(PathBuf),

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

impl BlockrefError {
    /// Short machine-readable code used by robot output.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::DocumentUnavailable { .. } => "document_unavailable",
            Self::NoActiveEditor => "no_active_editor",
            Self::NoActiveSession => "no_active_session",
            Self::InvalidSelection(_) => "invalid_selection",
            Self::VaultNotFound(_) => "vault_not_found",
            Self::Terminal(_) => "terminal",
            Self::ValidationFailed(_) => "validation_failed",
        }
    }
}
