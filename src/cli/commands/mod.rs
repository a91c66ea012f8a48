//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod completions;
pub mod config;
pub mod embed;
pub mod open;
pub mod search;

use crate::app::AppContext;
use crate::cli::formatters::format_outcome;
use crate::cli::output::{emit_json, robot_ok};
use crate::corpus::CorpusProvider;
use crate::error::{BlockrefError, Result};
use crate::render::Action;
use crate::session::{Outcome, SessionController};
use crate::tui::run_picker;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Open(args) => open::run(ctx, args),
        Commands::Embed(args) => embed::run(ctx, args),
        Commands::Search(args) => search::run(ctx, args),
        Commands::Config(args) => config::run(ctx, args),
        Commands::Completions(args) => completions::run(args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search blocks with references and open the chosen block's note
    #[command(visible_alias = "open-block-search")]
    Open(open::OpenArgs),

    /// Embed block from existing reference at the editor selection
    #[command(visible_alias = "embed-block-search")]
    Embed(embed::EmbedArgs),

    /// Rank blocks against a query and print the results
    Search(search::SearchArgs),

    /// Show or change settings
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Run one search session for `action`.
///
/// `query` replaces whatever the session seeded from the selection. With
/// `pick` (1-based) the session is driven without a terminal; otherwise the
/// interactive picker runs it.
pub(crate) fn run_session<C: CorpusProvider>(
    ctx: &AppContext,
    corpus: C,
    action: Action,
    query: Option<&str>,
    pick: Option<usize>,
) -> Result<()> {
    let mut controller = SessionController::new(corpus, ctx.config.clone());
    controller.begin(action);
    if let Some(query) = query {
        controller.update_query(query)?;
    }

    let outcome = match pick {
        Some(0) => {
            return Err(BlockrefError::InvalidSelection(
                "--pick counts from 1".to_string(),
            ));
        }
        Some(n) => controller.choose(n - 1)?,
        None if ctx.robot_mode => {
            return Err(BlockrefError::ValidationFailed(
                "--robot needs --pick; the picker is interactive".to_string(),
            ));
        }
        None => {
            let Some(outcome) = run_picker(&mut controller)? else {
                println!("Cancelled");
                return Ok(());
            };
            outcome
        }
    };

    report_outcome(ctx, &outcome)
}

fn report_outcome(ctx: &AppContext, outcome: &Outcome) -> Result<()> {
    if ctx.robot_mode {
        let response = robot_ok(outcome);
        let response = if matches!(outcome, Outcome::NoEditor { .. }) {
            response.with_warning("no active editor; insertion not applied")
        } else {
            response
        };
        return emit_json(&response);
    }
    println!("{}", format_outcome(outcome));
    Ok(())
}
