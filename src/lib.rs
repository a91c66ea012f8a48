//! blockref - fuzzy search over `^id` block references in a markdown vault.
//!
//! The core pipeline is extraction ([`extract`]), indexing ([`index`]),
//! ranking ([`rank`]) and presentation ([`render`]), driven by the
//! [`session::SessionController`]. Hosts plug in through
//! [`corpus::CorpusProvider`].

pub mod app;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod extract;
pub mod index;
pub mod rank;
pub mod render;
pub mod session;
pub mod tui;

#[doc(hidden)]
pub mod test_utils;

pub use error::{BlockrefError, Result};
