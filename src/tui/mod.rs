//! Terminal picker for a search session.
//!
//! A thin consumer of [`crate::render`] output: it turns display bodies into
//! ratatui lines and keystrokes into session calls. Selection movement lives
//! in [`PickerState`] so it can be tested without a terminal.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph};

use crate::corpus::CorpusProvider;
use crate::error::{BlockrefError, Result};
use crate::render::{Action, DisplayBody, SegmentKind};
use crate::session::{Outcome, RenderedItem, SessionController};

pub const PLACEHOLDER: &str = "Search for ^referenced blocks...";

/// What a keystroke asks the picker to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerCommand {
    Nothing,
    QueryChanged,
    Choose(usize),
    Cancel,
}

/// Query text and highlighted row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerState {
    query: String,
    selected: usize,
    len: usize,
}

impl PickerState {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Highlighted row, if there are any rows.
    pub const fn selected(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.selected)
        }
    }

    /// Record a new result count. The highlight returns to the top, as the
    /// best match moved.
    pub const fn set_len(&mut self, len: usize) {
        self.len = len;
        self.selected = 0;
    }

    pub const fn next(&mut self) {
        if self.len > 0 {
            self.selected = (self.selected + 1) % self.len;
        }
    }

    pub const fn previous(&mut self) {
        if self.len > 0 {
            self.selected = (self.selected + self.len - 1) % self.len;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> PickerCommand {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => PickerCommand::Cancel,
            KeyCode::Char('c') if ctrl => PickerCommand::Cancel,
            KeyCode::Char('n') if ctrl => {
                self.next();
                PickerCommand::Nothing
            }
            KeyCode::Char('p') if ctrl => {
                self.previous();
                PickerCommand::Nothing
            }
            KeyCode::Down => {
                self.next();
                PickerCommand::Nothing
            }
            KeyCode::Up => {
                self.previous();
                PickerCommand::Nothing
            }
            KeyCode::Enter => self
                .selected()
                .map_or(PickerCommand::Nothing, PickerCommand::Choose),
            KeyCode::Backspace => {
                if self.query.pop().is_some() {
                    PickerCommand::QueryChanged
                } else {
                    PickerCommand::Nothing
                }
            }
            KeyCode::Char(c) if !ctrl => {
                self.query.push(c);
                PickerCommand::QueryChanged
            }
            _ => PickerCommand::Nothing,
        }
    }
}

fn link_style() -> Style {
    Style::new().fg(Color::Cyan).add_modifier(Modifier::UNDERLINED)
}

/// One line with link segments styled apart from plain text.
pub fn body_line(body: &DisplayBody) -> Line<'static> {
    body.segments
        .iter()
        .map(|segment| match segment.kind {
            SegmentKind::Text => Span::raw(segment.text.clone()),
            SegmentKind::Link => Span::styled(segment.text.clone(), link_style()),
        })
        .collect::<Vec<_>>()
        .into()
}

fn item_text(item: &RenderedItem) -> Text<'static> {
    Text::from(vec![
        body_line(&item.body),
        Line::styled(item.label.clone(), Style::new().add_modifier(Modifier::DIM)),
    ])
}

fn query_line(query: &str) -> Line<'static> {
    if query.is_empty() {
        Line::styled(PLACEHOLDER, Style::new().add_modifier(Modifier::DIM))
    } else {
        Line::raw(query.to_string())
    }
}

fn draw(frame: &mut Frame, action: Action, state: &PickerState, items: &[RenderedItem]) {
    let [input_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(frame.area());

    let title = match action {
        Action::Open => " Search blocks with references ",
        Action::Embed => " Embed block from existing reference ",
    };
    frame.render_widget(
        Paragraph::new(query_line(state.query())).block(Block::bordered().title(title)),
        input_area,
    );

    let list = List::new(items.iter().map(|item| ListItem::new(item_text(item))))
        .block(Block::bordered().title(format!(" {} ", items.len())))
        .highlight_style(Style::new().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ListState::default().with_selected(state.selected());
    frame.render_stateful_widget(list, list_area, &mut list_state);
}

/// Restores the terminal even when the picker errors out.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        ratatui::restore();
    }
}

/// Run the started session interactively until an item is chosen or the
/// user cancels. Returns `None` on cancel.
pub fn run_picker<C: CorpusProvider>(
    controller: &mut SessionController<C>,
) -> Result<Option<Outcome>> {
    let Some(action) = controller.action() else {
        return Err(BlockrefError::NoActiveSession);
    };
    let mut state = PickerState::new(controller.query().unwrap_or_default());
    state.set_len(controller.results().len());

    let mut terminal =
        ratatui::try_init().map_err(|err| BlockrefError::Terminal(err.to_string()))?;
    let guard = TerminalGuard;

    let chosen = loop {
        let items = controller.items();
        terminal
            .draw(|frame| draw(frame, action, &state, &items))
            .map_err(|err| BlockrefError::Terminal(err.to_string()))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match state.handle_key(key) {
            PickerCommand::Nothing => {}
            PickerCommand::QueryChanged => {
                let shown = controller.update_query(state.query())?.len();
                state.set_len(shown);
            }
            PickerCommand::Choose(position) => break Some(position),
            PickerCommand::Cancel => break None,
        }
    };
    drop(guard);

    match chosen {
        Some(position) => controller.choose(position).map(Some),
        None => {
            controller.cancel();
            Ok(None)
        }
    }
}
