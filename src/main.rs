//! blockref - fuzzy search over ^id block references in a markdown vault.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use blockref::Result;
use blockref::app::AppContext;
use blockref::cli::output::report_error;
use blockref::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if !cli.quiet {
        init_tracing(cli.verbose, cli.robot);
    }

    if let Err(err) = run(&cli) {
        report_error(&err, cli.robot);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> Result<()> {
    // Completions need neither a vault nor settings.
    if let Commands::Completions(args) = &cli.command {
        return blockref::cli::commands::completions::run(args);
    }
    let ctx = AppContext::from_cli(cli)?;
    blockref::cli::commands::run(&ctx, &cli.command)
}

/// Filter used when `RUST_LOG` is unset. Component targets (`session`,
/// `vault`, ...) sit outside `blockref`, so their info events need `-v`.
const fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn,blockref=info",
        1 => "info,blockref=debug",
        2 => "debug,blockref=trace",
        _ => "trace",
    }
}

/// Log to stderr so stdout stays clean for results; JSON lines in robot mode.
fn init_tracing(verbose: u8, robot: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let registry = tracing_subscriber::registry().with(env_filter);

    if robot {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
