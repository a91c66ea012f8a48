//! Output formatters shared by commands.

pub mod block_results;

pub use block_results::{BlockResults, format_body, format_outcome};
