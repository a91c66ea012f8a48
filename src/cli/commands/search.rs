//! blockref search - Rank blocks against a query

use clap::Args;

use crate::app::AppContext;
use crate::cli::formatters::BlockResults;
use crate::cli::output::{emit_json, robot_ok};
use crate::config::clamp_limit;
use crate::corpus::VaultCorpus;
use crate::error::Result;
use crate::render::Action;
use crate::session::SessionController;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query (empty lists blocks in vault order)
    pub query: String,

    /// Maximum number of results (1-50, default from config)
    #[arg(long, short)]
    pub limit: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let corpus = VaultCorpus::open(&ctx.vault_root)?;
    let mut config = ctx.config.clone();
    if let Some(limit) = args.limit {
        config.search.limit = clamp_limit(limit);
    }

    let mut controller = SessionController::new(corpus, config);
    controller.begin(Action::Open);
    controller.update_query(&args.query)?;
    let results = BlockResults::new(&args.query, controller.candidate_count(), controller.items());
    controller.cancel();

    if ctx.robot_mode {
        return emit_json(&robot_ok(results));
    }
    print!("{}", results.format_human());
    Ok(())
}
