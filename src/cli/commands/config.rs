//! blockref config - Show or change settings
//!
//! `set` and `reset` edit a single file: the `--config` file if given,
//! otherwise the vault's `.blockref/config.toml`. Values are sanitized on
//! save, so an invalid format or limit is corrected rather than rejected.

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::config::{Config, global_config_path, vault_config_path};
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective settings
    Show,

    /// Show the config file locations
    Path,

    /// Set one value by dotted key (e.g. search.limit 20)
    Set {
        /// Dotted key, e.g. insert.format or search.fields.id
        key: String,
        value: String,
    },

    /// Restore default settings in the config file
    Reset,
}

#[derive(Serialize)]
struct ConfigPaths {
    active: String,
    global: Option<String>,
    vault: String,
}

#[derive(Serialize)]
struct SavedConfig<'a> {
    path: String,
    config: &'a Config,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommand::Show => show(ctx),
        ConfigCommand::Path => paths(ctx),
        ConfigCommand::Set { key, value } => {
            let mut config = Config::load_file(&ctx.config_path)?;
            config.set(key, value)?;
            let saved = config.save(&ctx.config_path)?;
            report_saved(ctx, &saved)
        }
        ConfigCommand::Reset => {
            let saved = Config::default().save(&ctx.config_path)?;
            report_saved(ctx, &saved)
        }
    }
}

fn show(ctx: &AppContext) -> Result<()> {
    if ctx.robot_mode {
        return emit_json(&robot_ok(&ctx.config));
    }
    emit_human(config_layout(&ctx.config));
    Ok(())
}

fn paths(ctx: &AppContext) -> Result<()> {
    let paths = ConfigPaths {
        active: ctx.config_path.display().to_string(),
        global: global_config_path().map(|p| p.display().to_string()),
        vault: vault_config_path(&ctx.vault_root).display().to_string(),
    };
    if ctx.robot_mode {
        return emit_json(&robot_ok(paths));
    }
    let mut layout = HumanLayout::new();
    layout
        .kv("active", &paths.active)
        .kv("global", paths.global.as_deref().unwrap_or("(none)"))
        .kv("vault", &paths.vault);
    emit_human(layout);
    Ok(())
}

fn report_saved(ctx: &AppContext, saved: &Config) -> Result<()> {
    let path = ctx.config_path.display().to_string();
    if ctx.robot_mode {
        return emit_json(&robot_ok(SavedConfig {
            path,
            config: saved,
        }));
    }
    let mut layout = config_layout(saved);
    layout.blank().push_line(format!("Saved {path}"));
    emit_human(layout);
    Ok(())
}

/// Every settable key with its value.
pub fn config_layout(config: &Config) -> HumanLayout {
    let fields = config.search.fields;
    let mut layout = HumanLayout::new();
    layout
        .section("Insert")
        .kv("insert.format", &config.insert.format)
        .kv("insert.keep_text", &config.insert.keep_text.to_string())
        .blank()
        .section("Display")
        .kv("display.parse_links", &config.display.parse_links.to_string())
        .kv(
            "display.remove_id_from_content",
            &config.display.remove_id_from_content.to_string(),
        )
        .kv("display.file_name", &config.display.file_name.to_string())
        .blank()
        .section("Search")
        .kv(
            "search.selected_text_as_search",
            &config.search.selected_text_as_search.to_string(),
        )
        .kv("search.limit", &config.search.limit.to_string())
        .kv("search.fields.content", &fields.content.to_string())
        .kv("search.fields.path", &fields.path.to_string())
        .kv("search.fields.id", &fields.id.to_string());
    layout
}
