use clap::Parser;

use blockref::cli::commands::config::ConfigCommand;
use blockref::cli::{Cli, Commands};

fn parse(args: &[&str]) -> Commands {
    let mut argv = vec!["blockref"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv).command
}

#[test]
fn parse_open_flags() {
    match parse(&["open", "--query", "soup", "--pick", "2", "--launch"]) {
        Commands::Open(args) => {
            assert_eq!(args.query.as_deref(), Some("soup"));
            assert_eq!(args.pick, Some(2));
            assert!(args.launch);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_embed_target() {
    match parse(&["embed", "--into", "daily/today.md", "--range", "4..9"]) {
        Commands::Embed(args) => {
            assert_eq!(args.into.as_deref(), Some("daily/today.md"));
            assert_eq!(args.range, Some(4..9));
            assert!(args.pick.is_none());
            assert!(args.query.is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_command_aliases() {
    assert!(matches!(parse(&["open-block-search"]), Commands::Open(_)));
    assert!(matches!(parse(&["embed-block-search"]), Commands::Embed(_)));
}

#[test]
fn parse_search_limit() {
    match parse(&["search", "tomato", "-l", "3"]) {
        Commands::Search(args) => {
            assert_eq!(args.query, "tomato");
            assert_eq!(args.limit, Some(3));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_config_set() {
    match parse(&["config", "set", "search.fields.id", "false"]) {
        Commands::Config(args) => match args.command {
            ConfigCommand::Set { key, value } => {
                assert_eq!(key, "search.fields.id");
                assert_eq!(value, "false");
            }
            other => panic!("unexpected config command: {other:?}"),
        },
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn bad_range_is_rejected() {
    let err = Cli::try_parse_from(["blockref", "embed", "--into", "a.md", "--range", "9..4"])
        .unwrap_err();
    assert!(err.to_string().contains("range start 9 is after end 4"));
}
