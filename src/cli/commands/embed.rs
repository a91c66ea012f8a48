//! blockref embed - Insert a reference to a block at the editor selection
//!
//! The editor is simulated by `--into NOTE` and an optional byte `--range`.
//! Without `--into` there is no editor and the reference is only printed.

use clap::Args;

use crate::app::AppContext;
use crate::corpus::{EditorTarget, VaultCorpus};
use crate::error::Result;
use crate::render::Action;

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Initial query (overrides the selection as search seed)
    #[arg(long)]
    pub query: Option<String>,

    /// Choose the N-th ranked block (1-based) instead of opening the picker
    #[arg(long, short)]
    pub pick: Option<usize>,

    /// Vault-relative note to insert into
    #[arg(long)]
    pub into: Option<String>,

    /// Selected byte range in the note: START..END or START (default: end of note)
    #[arg(long, requires = "into", value_parser = parse_range)]
    pub range: Option<std::ops::Range<usize>>,
}

fn parse_range(value: &str) -> std::result::Result<std::ops::Range<usize>, String> {
    EditorTarget::parse_range(value).map_err(|err| err.to_string())
}

pub fn run(ctx: &AppContext, args: &EmbedArgs) -> Result<()> {
    let mut corpus = VaultCorpus::open(&ctx.vault_root)?;
    if let Some(note) = &args.into {
        corpus = corpus.with_editor(note, args.range.clone())?;
    }
    super::run_session(ctx, corpus, Action::Embed, args.query.as_deref(), args.pick)
}
