//! blockref open - Search blocks with references and open one

use clap::Args;

use crate::app::AppContext;
use crate::corpus::VaultCorpus;
use crate::error::Result;
use crate::render::Action;

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Initial query
    #[arg(long)]
    pub query: Option<String>,

    /// Choose the N-th ranked block (1-based) instead of opening the picker
    #[arg(long, short)]
    pub pick: Option<usize>,

    /// Open the note with the system handler
    #[arg(long)]
    pub launch: bool,
}

pub fn run(ctx: &AppContext, args: &OpenArgs) -> Result<()> {
    let corpus = VaultCorpus::open(&ctx.vault_root)?.with_launch(args.launch);
    super::run_session(ctx, corpus, Action::Open, args.query.as_deref(), args.pick)
}
