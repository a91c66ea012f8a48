use tracing::Level;

use blockref::config::Config;
use blockref::corpus::{CorpusProvider, VaultCorpus};
use blockref::render::Action;
use blockref::session::{Outcome, SessionController};
use blockref::test_utils::fixtures::UnitTestFixture;
use blockref::test_utils::logging::capture_logs;

fn vault() -> UnitTestFixture {
    let fixture = UnitTestFixture::new();
    fixture.create_note("Alpha", &[("a1", "First alpha block"), ("a2", "Second alpha block")]);
    fixture.create_note("Beta", &[("b1", "Only beta block")]);
    fixture.create_file("Draft.md", "Intro. NOTE link\n");
    fixture
}

#[test]
fn deleted_note_is_skipped_not_fatal() {
    let fixture = vault();
    let corpus = VaultCorpus::open(&fixture.data_path).unwrap();
    std::fs::remove_file(fixture.data_path.join("Alpha.md")).unwrap();

    let mut controller = SessionController::new(corpus, Config::default());
    let ((), logs) = capture_logs(|| controller.begin(Action::Open));

    let ids: Vec<String> = controller.items().into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec!["b1"]);
    let skipped = logs.with_target("extract");
    assert!(
        skipped
            .iter()
            .any(|e| e.message.contains("skipping unreadable document")
                && e.field("path") == Some("Alpha.md")),
        "{}",
        logs.format_for_display()
    );
    assert!(!logs.contains_level(Level::ERROR));
}

#[test]
fn embed_round_trip_through_vault() {
    let fixture = vault();
    let corpus = VaultCorpus::open(&fixture.data_path)
        .unwrap()
        .with_editor("Draft.md", Some(7..11))
        .unwrap();
    assert_eq!(corpus.selection(), "NOTE");

    let mut config = Config::default();
    config.insert.keep_text = true;
    let mut controller = SessionController::new(corpus, config);
    controller.begin(Action::Embed);
    controller.update_query("beta").unwrap();

    let outcome = controller.choose(0).unwrap();
    assert!(matches!(outcome, Outcome::Embedded { .. }));
    assert_eq!(
        fixture.read_file("Draft.md"),
        "Intro. ![[Beta#^b1|NOTE]] link\n"
    );
}

#[test]
fn second_session_sees_new_blocks() {
    let fixture = vault();
    let mut controller =
        SessionController::new(VaultCorpus::open(&fixture.data_path).unwrap(), Config::default());
    controller.begin(Action::Open);
    assert_eq!(controller.candidate_count(), 3);
    controller.cancel();

    // Blocks come from the scan taken when the vault was opened; reopening
    // picks up the new note.
    fixture.create_note("Gamma", &[("g1", "Gamma block")]);
    let mut controller =
        SessionController::new(VaultCorpus::open(&fixture.data_path).unwrap(), Config::default());
    controller.begin(Action::Open);
    assert_eq!(controller.candidate_count(), 4);
}

#[test]
fn edited_block_text_is_read_live() {
    let fixture = vault();
    let mut controller =
        SessionController::new(VaultCorpus::open(&fixture.data_path).unwrap(), Config::default());

    // Same byte length, so the scanned spans still fit.
    fixture.create_note("Beta", &[("b1", "Other beta text")]);
    controller.begin(Action::Open);
    controller.update_query("other").unwrap();
    let items = controller.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].body.plain_text(), "Other beta text");
}
