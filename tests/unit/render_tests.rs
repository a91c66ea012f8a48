use blockref::config::{Config, FileNameDisplay};
use blockref::corpus::Document;
use blockref::extract::BlockRecord;
use blockref::render::{Action, build_insertion, display_body, display_label};
use blockref::test_utils::{TestCase, run_table_tests};

fn record(path: &str, id: &str, content: &str) -> BlockRecord {
    BlockRecord {
        document: Document::new(path),
        id: id.to_string(),
        content: content.to_string(),
    }
}

#[test]
fn display_body_cases() -> Result<(), String> {
    let cases = vec![
        TestCase::new(
            "id stripped",
            ("Some text. ^abc123", "abc123", true, true),
            ("Some text.".to_string(), Vec::<String>::new()),
        ),
        TestCase::new(
            "id kept",
            ("Some text. ^abc123", "abc123", false, true),
            ("Some text. ^abc123".to_string(), Vec::new()),
        ),
        TestCase::new(
            "link flattened",
            ("See [my note](other.md) for details", "x", true, true),
            ("See my note for details".to_string(), vec!["my note".to_string()]),
        ),
        TestCase::new(
            "link left raw",
            ("See [my note](other.md) ^x", "x", true, false),
            ("See [my note](other.md)".to_string(), Vec::new()),
        ),
        TestCase::new(
            "anchor mid-text only first removed",
            ("^x then ^x", "x", true, true),
            ("then ^x".to_string(), Vec::new()),
        ),
    ];

    run_table_tests(cases, |(content, id, remove_id, parse_links)| {
        let mut config = Config::default();
        config.display.remove_id_from_content = remove_id;
        config.display.parse_links = parse_links;
        let body = display_body(&record("n.md", id, content), &config);
        let links = body.links().map(str::to_string).collect();
        (body.plain_text(), links)
    })
}

#[test]
fn label_cases() -> Result<(), String> {
    let cases = vec![
        TestCase::new("base", FileNameDisplay::Base, "Recipes#^soup".to_string()),
        TestCase::new("path", FileNameDisplay::Path, "a/b/Recipes.md#^soup".to_string()),
    ];
    run_table_tests(cases, |file_name| {
        let mut config = Config::default();
        config.display.file_name = file_name;
        display_label(&record("a/b/Recipes.md", "soup", "Soup ^soup"), &config)
    })
}

#[test]
fn insertion_cases() -> Result<(), String> {
    let cases = vec![
        TestCase::new(
            "default format",
            ("!{link}", false, "this part"),
            Some("![[Recipes#^soup]]".to_string()),
        ),
        TestCase::new(
            "keep selected text",
            ("!{link}", true, "this part"),
            Some("![[Recipes#^soup|this part]]".to_string()),
        ),
        TestCase::new(
            "keep text without selection",
            ("!{link}", true, ""),
            Some("![[Recipes#^soup]]".to_string()),
        ),
        TestCase::new(
            "custom format",
            ("> {link}\n", false, ""),
            Some("> [[Recipes#^soup]]\n".to_string()),
        ),
        TestCase::new(
            "placeholder missing",
            ("plain", false, ""),
            Some("plain".to_string()),
        ),
    ];
    run_table_tests(cases, |(format, keep_text, selection)| {
        let mut config = Config::default();
        config.insert.format = format.to_string();
        config.insert.keep_text = keep_text;
        build_insertion(
            Action::Embed,
            &record("a/b/Recipes.md", "soup", "Soup ^soup"),
            &config,
            selection,
        )
    })
}
