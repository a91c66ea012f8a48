use std::path::PathBuf;

use blockref::config::{Config, FileNameDisplay};
use blockref::test_utils::{TestCase, run_table_tests};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn config_files_from_fixture() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "default",
            input: "tests/fixtures/configs/default.toml",
            expected: (
                "!{link}".to_string(),
                false,
                true,
                FileNameDisplay::Base,
                10usize,
                (true, true, true),
            ),
        },
        TestCase {
            name: "custom",
            input: "tests/fixtures/configs/custom.toml",
            expected: (
                "see {link}".to_string(),
                true,
                false,
                FileNameDisplay::Path,
                25,
                (false, true, true),
            ),
        },
        TestCase {
            name: "out_of_range_limit",
            input: "tests/fixtures/configs/out_of_range.toml",
            expected: (
                "!{link}".to_string(),
                false,
                true,
                FileNameDisplay::Base,
                50,
                (true, true, true),
            ),
        },
    ];

    run_table_tests(cases, |relative_path| {
        let config = Config::load_file(&fixture_path(relative_path)).expect("load fixture");
        let fields = config.search.fields;
        (
            config.insert.format,
            config.insert.keep_text,
            config.display.parse_links,
            config.display.file_name,
            config.search.limit,
            (fields.content, fields.path, fields.id),
        )
    })
}

#[test]
fn missing_file_gives_defaults() {
    let config = Config::load_file(&fixture_path("tests/fixtures/configs/absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn set_then_save_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.set("insert.keep_text", "yes").unwrap();
    config.set("search.fields.path", "off").unwrap();
    config.set("search.limit", "0").unwrap();
    let saved = config.save(&path).unwrap();
    assert_eq!(saved.search.limit, 1);

    let reloaded = Config::load_file(&path).unwrap();
    assert_eq!(reloaded, saved);
    assert!(reloaded.insert.keep_text);
    assert!(!reloaded.search.fields.path);
}

#[test]
fn bool_keys_reject_garbage() -> Result<(), String> {
    let cases = vec![
        TestCase::new("true word", ("insert.keep_text", "true"), true),
        TestCase::new("numeric", ("display.parse_links", "0"), true),
        TestCase::new("garbage", ("search.fields.id", "maybe"), false),
        TestCase::new("bad choice", ("display.file_name", "full"), false),
        TestCase::new("bad number", ("search.limit", "ten"), false),
    ];
    run_table_tests(cases, |(key, value)| Config::default().set(key, value).is_ok())
}
