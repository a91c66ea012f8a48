//! Search session lifecycle.
//!
//! A [`SessionController`] is either idle or running one search session.
//! Starting a session re-extracts blocks from the live corpus and builds a
//! fresh index; keystrokes re-rank against that index; choosing an item runs
//! the session's action and returns to idle.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::corpus::{CorpusProvider, Document};
use crate::error::{BlockrefError, Result};
use crate::extract::{BlockRecord, extract};
use crate::index::{SearchableRecord, build_index};
use crate::rank::{MatchResult, rank};
use crate::render::{Action, DisplayBody, build_insertion, display_body, display_label};

/// One result row, ready for any renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedItem {
    pub document: Document,
    pub id: String,
    pub score: i64,
    /// Matched character offsets within the record's search text.
    pub positions: Vec<usize>,
    pub body: DisplayBody,
    pub label: String,
}

/// What choosing an item did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Opened { record: BlockRecord },
    Embedded { record: BlockRecord, insertion: String },
    /// Embed chosen with no editor open; the insertion was not applied.
    NoEditor { record: BlockRecord, insertion: String },
}

impl Outcome {
    pub const fn record(&self) -> &BlockRecord {
        match self {
            Self::Opened { record }
            | Self::Embedded { record, .. }
            | Self::NoEditor { record, .. } => record,
        }
    }
}

#[derive(Debug)]
struct SearchSession {
    action: Action,
    index: Vec<SearchableRecord>,
    query: String,
    results: Vec<MatchResult>,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Searching(SearchSession),
}

/// Owns the corpus, the authoritative configuration and the session state.
#[derive(Debug)]
pub struct SessionController<C> {
    corpus: C,
    config: Config,
    state: State,
}

impl<C: CorpusProvider> SessionController<C> {
    pub fn new(corpus: C, config: Config) -> Self {
        Self {
            corpus,
            config,
            state: State::Idle,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// A running session has its search text rebuilt from the records it
    /// already extracted and its current query re-ranked, so results, labels
    /// and the limit all follow the new settings at once.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        let State::Searching(session) = &mut self.state else {
            return;
        };
        let records = std::mem::take(&mut session.index)
            .into_iter()
            .map(|searchable| searchable.record)
            .collect();
        session.index = build_index(records, self.config.search.fields);
        session.results = rank(&session.query, &session.index, self.config.search.limit);
        debug!(target: "session", shown = session.results.len(), "settings changed; session re-ranked");
    }

    pub const fn corpus(&self) -> &C {
        &self.corpus
    }

    pub const fn corpus_mut(&mut self) -> &mut C {
        &mut self.corpus
    }

    pub const fn is_searching(&self) -> bool {
        matches!(self.state, State::Searching(_))
    }

    /// Action of the running session.
    pub const fn action(&self) -> Option<Action> {
        match &self.state {
            State::Searching(session) => Some(session.action),
            State::Idle => None,
        }
    }

    /// Current query of the running session.
    pub fn query(&self) -> Option<&str> {
        match &self.state {
            State::Searching(session) => Some(session.query.as_str()),
            State::Idle => None,
        }
    }

    /// Number of blocks in the running session's index.
    pub fn candidate_count(&self) -> usize {
        match &self.state {
            State::Searching(session) => session.index.len(),
            State::Idle => 0,
        }
    }

    /// Start a session for `action`, discarding any session in progress.
    ///
    /// With `selected_text_as_search` the editor selection seeds the query and
    /// is ranked once, exactly as a typed query would be.
    pub fn begin(&mut self, action: Action) {
        if self.is_searching() {
            debug!(target: "session", "replacing running session");
        }

        let records = extract(&self.corpus);
        let index = build_index(records, self.config.search.fields);
        info!(target: "session", %action, blocks = index.len(), "search session started");

        let query = if self.config.search.selected_text_as_search {
            self.corpus.selection()
        } else {
            String::new()
        };
        let results = rank(&query, &index, self.config.search.limit);
        self.state = State::Searching(SearchSession {
            action,
            index,
            query,
            results,
        });
    }

    /// Re-rank the running session's index against `query`.
    ///
    /// The index is never rebuilt here. Ranking completes before this returns,
    /// so the results always belong to the latest query.
    pub fn update_query(&mut self, query: &str) -> Result<&[MatchResult]> {
        let limit = self.config.search.limit;
        let State::Searching(session) = &mut self.state else {
            return Err(BlockrefError::NoActiveSession);
        };
        session.query = query.to_string();
        session.results = rank(query, &session.index, limit);
        debug!(target: "session", query, shown = session.results.len(), "query updated");
        Ok(&session.results)
    }

    /// Raw ranking of the running session, best first.
    pub fn results(&self) -> &[MatchResult] {
        match &self.state {
            State::Searching(session) => &session.results,
            State::Idle => &[],
        }
    }

    /// Current results passed through the presentation layer.
    pub fn items(&self) -> Vec<RenderedItem> {
        let State::Searching(session) = &self.state else {
            return Vec::new();
        };
        session
            .results
            .iter()
            .map(|result| {
                let record = &session.index[result.candidate].record;
                RenderedItem {
                    document: record.document.clone(),
                    id: record.id.clone(),
                    score: result.score,
                    positions: result.positions.clone(),
                    body: display_body(record, &self.config),
                    label: display_label(record, &self.config),
                }
            })
            .collect()
    }

    /// Choose the result at `position` (0-based) and run the session action.
    ///
    /// An out-of-range position leaves the session running. Otherwise the
    /// controller is idle afterwards, whether or not the corpus call
    /// succeeded.
    pub fn choose(&mut self, position: usize) -> Result<Outcome> {
        let State::Searching(session) = &self.state else {
            return Err(BlockrefError::NoActiveSession);
        };
        if position >= session.results.len() {
            return Err(BlockrefError::InvalidSelection(format!(
                "item {} of {}",
                position + 1,
                session.results.len()
            )));
        }

        let State::Searching(session) = std::mem::take(&mut self.state) else {
            return Err(BlockrefError::NoActiveSession);
        };
        let candidate = session.results[position].candidate;
        let record = session.index.into_iter().nth(candidate).map(|s| s.record).ok_or_else(
            || BlockrefError::InvalidSelection(format!("candidate {candidate} not in index")),
        )?;

        let selection = self.corpus.selection();
        let Some(insertion) = build_insertion(session.action, &record, &self.config, &selection)
        else {
            self.corpus.navigate_to(&record.document)?;
            info!(target: "session", path = %record.document.path, id = %record.id, "opened block");
            return Ok(Outcome::Opened { record });
        };

        match self.corpus.replace_selection(&insertion) {
            Ok(()) => {
                info!(target: "session", %insertion, "embedded block reference");
                Ok(Outcome::Embedded { record, insertion })
            }
            Err(BlockrefError::NoActiveEditor) => {
                warn!(target: "session", %insertion, "no active editor; insertion not applied");
                Ok(Outcome::NoEditor { record, insertion })
            }
            Err(err) => Err(err),
        }
    }

    /// Leave the running session without acting. Returns whether one was
    /// running.
    pub fn cancel(&mut self) -> bool {
        let was_searching = self.is_searching();
        self.state = State::Idle;
        if was_searching {
            debug!(target: "session", "search session cancelled");
        }
        was_searching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MemoryCorpus;
    use crate::test_utils::logging::capture_logs;
    use tracing::Level;

    fn corpus() -> MemoryCorpus {
        MemoryCorpus::new()
            .with_blocks(
                "Recipes.md",
                &[("soup", "Tomato soup ^soup"), ("bread", "Sourdough bread ^bread")],
            )
            .with_blocks("notes/Garden.md", &[("beans", "Plant beans in May ^beans")])
    }

    fn ids(controller: &SessionController<MemoryCorpus>) -> Vec<String> {
        controller.items().into_iter().map(|i| i.id).collect()
    }

    #[test]
    fn begin_lists_corpus_in_order() {
        let mut controller = SessionController::new(corpus(), Config::default());
        assert!(!controller.is_searching());

        controller.begin(Action::Open);
        assert!(controller.is_searching());
        assert_eq!(controller.action(), Some(Action::Open));
        assert_eq!(controller.query(), Some(""));
        assert_eq!(ids(&controller), vec!["soup", "bread", "beans"]);
    }

    #[test]
    fn keystrokes_rerank_without_rebuilding() {
        let mut controller = SessionController::new(corpus(), Config::default());
        controller.begin(Action::Open);

        let results = controller.update_query("bean").unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(ids(&controller), vec!["beans"]);

        controller.update_query("s").unwrap();
        assert_eq!(controller.items().len(), 3);
        assert_eq!(controller.candidate_count(), 3);
    }

    #[test]
    fn last_query_wins() {
        let mut controller = SessionController::new(corpus(), Config::default());
        controller.begin(Action::Open);
        controller.update_query("bread").unwrap();
        controller.update_query("soup").unwrap();
        assert_eq!(controller.query(), Some("soup"));
        assert_eq!(ids(&controller)[0], "soup");
    }

    #[test]
    fn items_carry_rendered_body_and_label() {
        let mut controller = SessionController::new(corpus(), Config::default());
        controller.begin(Action::Open);
        controller.update_query("beans").unwrap();

        let item = &controller.items()[0];
        assert_eq!(item.body.plain_text(), "Plant beans in May");
        assert_eq!(item.label, "Garden#^beans");
        assert!(!item.positions.is_empty());
    }

    #[test]
    fn selection_seeds_query_when_enabled() {
        let mut config = Config::default();
        config.search.selected_text_as_search = true;
        let corpus = corpus().with_editor("bread");
        let mut controller = SessionController::new(corpus, config);

        controller.begin(Action::Embed);
        assert_eq!(controller.query(), Some("bread"));
        assert_eq!(ids(&controller), vec!["bread"]);
    }

    #[test]
    fn selection_ignored_when_disabled() {
        let corpus = corpus().with_editor("bread");
        let mut controller = SessionController::new(corpus, Config::default());
        controller.begin(Action::Embed);
        assert_eq!(controller.query(), Some(""));
        assert_eq!(controller.items().len(), 3);
    }

    #[test]
    fn choosing_open_navigates_and_ends_session() {
        let mut controller = SessionController::new(corpus(), Config::default());
        controller.begin(Action::Open);
        controller.update_query("beans").unwrap();

        let outcome = controller.choose(0).unwrap();
        assert_eq!(outcome.record().id, "beans");
        assert!(matches!(outcome, Outcome::Opened { .. }));
        assert!(!controller.is_searching());
        assert_eq!(
            controller.corpus().navigations(),
            &[Document::new("notes/Garden.md")]
        );
    }

    #[test]
    fn choosing_embed_replaces_selection() {
        let mut config = Config::default();
        config.insert.keep_text = true;
        let corpus = corpus().with_editor("this part");
        let mut controller = SessionController::new(corpus, config);
        controller.begin(Action::Embed);
        controller.update_query("soup").unwrap();

        let outcome = controller.choose(0).unwrap();
        assert_eq!(
            outcome,
            Outcome::Embedded {
                record: outcome.record().clone(),
                insertion: "![[Recipes#^soup|this part]]".to_string(),
            }
        );
        let editor = controller.corpus().editor().unwrap();
        assert_eq!(editor.replacements, vec!["![[Recipes#^soup|this part]]"]);
        assert!(controller.corpus().navigations().is_empty());
    }

    #[test]
    fn embed_without_editor_is_reported() {
        let mut controller = SessionController::new(corpus(), Config::default());
        controller.begin(Action::Embed);

        let (outcome, logs) = capture_logs(|| controller.choose(0));
        let outcome = outcome.unwrap();
        assert_eq!(
            outcome,
            Outcome::NoEditor {
                record: outcome.record().clone(),
                insertion: "![[Recipes#^soup]]".to_string(),
            }
        );
        assert!(logs.contains_message("no active editor"));
        assert!(logs.contains_level(Level::WARN));
        assert!(!controller.is_searching());
    }

    #[test]
    fn out_of_range_choice_keeps_session() {
        let mut controller = SessionController::new(corpus(), Config::default());
        controller.begin(Action::Open);
        controller.update_query("bean").unwrap();

        let err = controller.choose(1).unwrap_err();
        assert!(matches!(err, BlockrefError::InvalidSelection(_)));
        assert!(controller.is_searching());
        assert!(controller.corpus().navigations().is_empty());
    }

    #[test]
    fn cancel_takes_no_action() {
        let corpus = corpus().with_editor("keep me");
        let mut controller = SessionController::new(corpus, Config::default());
        controller.begin(Action::Embed);

        assert!(controller.cancel());
        assert!(!controller.cancel());
        assert!(controller.items().is_empty());
        let editor = controller.corpus().editor().unwrap();
        assert!(editor.replacements.is_empty());
        assert_eq!(editor.selection, "keep me");
    }

    #[test]
    fn idle_controller_rejects_session_calls() {
        let mut controller = SessionController::new(corpus(), Config::default());
        assert!(matches!(
            controller.update_query("x"),
            Err(BlockrefError::NoActiveSession)
        ));
        assert!(matches!(
            controller.choose(0),
            Err(BlockrefError::NoActiveSession)
        ));
        assert!(controller.results().is_empty());
    }

    #[test]
    fn new_session_sees_corpus_changes() {
        let mut controller = SessionController::new(corpus(), Config::default());
        controller.begin(Action::Open);
        assert_eq!(controller.candidate_count(), 3);
        controller.cancel();

        let grown = std::mem::take(controller.corpus_mut())
            .with_blocks("Later.md", &[("late", "Added later ^late")]);
        *controller.corpus_mut() = grown;

        controller.begin(Action::Open);
        assert_eq!(controller.candidate_count(), 4);
    }

    #[test]
    fn limit_and_fields_follow_config() {
        let mut config = Config::default();
        config.search.limit = 2;
        let mut controller = SessionController::new(corpus(), config.clone());
        controller.begin(Action::Open);
        assert_eq!(controller.items().len(), 2);

        config.search.fields.content = false;
        controller.set_config(config);
        controller.begin(Action::Open);
        controller.update_query("garden").unwrap();
        assert_eq!(ids(&controller), vec!["beans"]);
        controller.update_query("tomato").unwrap();
        assert!(controller.items().is_empty());
    }

    #[test]
    fn settings_change_mid_session_rebuilds_search_text() {
        let mut controller = SessionController::new(corpus(), Config::default());
        controller.begin(Action::Open);
        controller.update_query("tomato").unwrap();
        assert_eq!(ids(&controller), vec!["soup"]);

        let mut config = Config::default();
        config.search.fields.content = false;
        config.search.limit = 1;
        config.display.file_name = crate::config::FileNameDisplay::Path;
        controller.set_config(config);

        assert!(controller.results().is_empty());
        controller.update_query("tomato").unwrap();
        assert!(controller.items().is_empty());

        controller.update_query("md").unwrap();
        let items = controller.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Recipes.md#^soup");
        assert_eq!(controller.candidate_count(), 3);
    }
}
