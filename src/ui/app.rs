//! Form state: the URL field, the Idle/Processing machine and what the output
//! panel shows.

use crate::document::format_duration;
use crate::pipeline::Outcome;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Awaiting submission
    Idle,
    /// Pipeline running; input is ignored
    Processing,
}

/// Contents of the output panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display {
    Nothing,
    EmptyInput,
    InvalidUrl,
    Summary {
        title: String,
        details: Option<String>,
        text: String,
    },
    Error {
        chain: Vec<String>,
    },
}

/// Input action decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Quit,
    Insert(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    ClearInput,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    None,
}

/// Map a key press to an action for the current phase
pub fn action_for(key: KeyEvent, phase: Phase) -> Action {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if phase == Phase::Processing {
        return Action::None;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => Action::Submit,
        (KeyCode::Esc, _) => Action::Quit,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::ClearInput,
        (KeyCode::Char(c), m) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Action::Insert(c)
        }
        (KeyCode::Backspace, _) => Action::Backspace,
        (KeyCode::Delete, _) => Action::Delete,
        (KeyCode::Left, _) => Action::CursorLeft,
        (KeyCode::Right, _) => Action::CursorRight,
        (KeyCode::Home, _) => Action::CursorHome,
        (KeyCode::End, _) => Action::CursorEnd,
        (KeyCode::Up, _) => Action::ScrollUp,
        (KeyCode::Down, _) => Action::ScrollDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,
        _ => Action::None,
    }
}

#[derive(Debug)]
pub struct App {
    pub input: String,
    /// Cursor position in characters
    pub cursor: usize,
    pub phase: Phase,
    pub display: Display,
    pub scroll: u16,
    pub should_quit: bool,
    spinner_frame: usize,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            cursor: 0,
            phase: Phase::Idle,
            display: Display::Nothing,
            scroll: 0,
            should_quit: false,
            spinner_frame: 0,
        }
    }

    /// Handle a key press. Returns the submitted text when a run should start.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        self.apply(action_for(key, self.phase))
    }

    pub fn apply(&mut self, action: Action) -> Option<String> {
        match action {
            Action::Submit => return Some(self.begin()),
            Action::Quit => self.should_quit = true,
            Action::Insert(c) => {
                let at = self.byte_index();
                self.input.insert(at, c);
                self.cursor += 1;
            }
            Action::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index();
                    self.input.remove(at);
                }
            }
            Action::Delete => {
                if self.cursor < self.input_len() {
                    let at = self.byte_index();
                    self.input.remove(at);
                }
            }
            Action::CursorLeft => self.cursor = self.cursor.saturating_sub(1),
            Action::CursorRight => self.cursor = (self.cursor + 1).min(self.input_len()),
            Action::CursorHome => self.cursor = 0,
            Action::CursorEnd => self.cursor = self.input_len(),
            Action::ClearInput => {
                self.input.clear();
                self.cursor = 0;
            }
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::ScrollDown => self.scroll = self.scroll.saturating_add(1),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(10),
            Action::PageDown => self.scroll = self.scroll.saturating_add(10),
            Action::None => {}
        }
        None
    }

    /// Idle -> Processing
    fn begin(&mut self) -> String {
        self.phase = Phase::Processing;
        self.spinner_frame = 0;
        self.input.clone()
    }

    /// Processing -> Idle, showing exactly one result
    pub fn finish(&mut self, outcome: Outcome) {
        self.display = match outcome {
            Outcome::EmptyInput => Display::EmptyInput,
            Outcome::InvalidUrl => Display::InvalidUrl,
            Outcome::Summarised { document, summary } => {
                let meta = &document.metadata;
                let details: Vec<String> = [
                    meta.author.clone(),
                    meta.duration.map(format_duration),
                    meta.publish_date.clone(),
                    meta.language.as_ref().map(|lang| format!("captions: {lang}")),
                ]
                .into_iter()
                .flatten()
                .collect();

                Display::Summary {
                    title: document.display_title().to_string(),
                    details: (!details.is_empty()).then(|| details.join(" • ")),
                    text: summary.text,
                }
            }
            Outcome::Failed(err) => Display::Error { chain: err.chain() },
        };
        self.phase = Phase::Idle;
        self.scroll = 0;
    }

    /// Advance the busy indicator
    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER[self.spinner_frame]
    }

    fn input_len(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Metadata};
    use crate::loader::FetchError;
    use crate::pipeline::PipelineError;
    use crate::summary::Summary;
    use std::time::Duration;
    use url::Url;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
        }
    }

    #[test]
    fn starts_idle_and_empty() {
        let app = App::new();
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.display, Display::Nothing);
        assert!(app.input.is_empty());
    }

    #[test]
    fn editing_respects_cursor() {
        let mut app = App::new();
        type_text(&mut app, "https://exmple.com");
        for _ in 0.."mple.com".len() {
            app.handle_key(key(KeyCode::Left));
        }
        type_text(&mut app, "a");
        assert_eq!(app.input, "https://example.com");

        app.handle_key(key(KeyCode::End));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "https://example.co");

        app.handle_key(key(KeyCode::Home));
        app.handle_key(key(KeyCode::Delete));
        assert_eq!(app.input, "ttps://example.co");

        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(app.input.is_empty());
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn multibyte_input_is_safe() {
        let mut app = App::new();
        type_text(&mut app, "héllo");
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "hélo");
    }

    #[test]
    fn enter_moves_to_processing_and_returns_input() {
        let mut app = App::new();
        type_text(&mut app, "https://example.com");

        let submitted = app.handle_key(key(KeyCode::Enter));
        assert_eq!(submitted.as_deref(), Some("https://example.com"));
        assert_eq!(app.phase, Phase::Processing);
    }

    #[test]
    fn keys_are_ignored_while_processing() {
        let mut app = App::new();
        type_text(&mut app, "x");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        app.handle_key(key(KeyCode::Char('y')));
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.input, "x");
        assert!(!app.should_quit);

        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn validation_outcomes_return_to_idle() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Enter));
        app.finish(Outcome::EmptyInput);
        assert_eq!(app.phase, Phase::Idle);
        assert_eq!(app.display, Display::EmptyInput);

        app.handle_key(key(KeyCode::Enter));
        app.finish(Outcome::InvalidUrl);
        assert_eq!(app.display, Display::InvalidUrl);
    }

    #[test]
    fn summary_outcome_collects_details() {
        let mut app = App::new();
        app.scroll = 4;
        let document = Document::new(
            Url::parse("https://youtu.be/dQw4w9WgXcQ").unwrap(),
            "transcript".into(),
            Metadata {
                title: Some("Never Gonna Give You Up".into()),
                author: Some("Rick Astley".into()),
                duration: Some(Duration::from_secs(212)),
                language: Some("en".into()),
                ..Metadata::default()
            },
        );

        app.finish(Outcome::Summarised {
            document,
            summary: Summary::new("A song."),
        });

        assert_eq!(
            app.display,
            Display::Summary {
                title: "Never Gonna Give You Up".into(),
                details: Some("Rick Astley • 3:32 • captions: en".into()),
                text: "A song.".into(),
            }
        );
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn failure_outcome_keeps_error_detail() {
        let mut app = App::new();
        app.finish(Outcome::Failed(PipelineError::Fetch(FetchError::NoTranscript(
            "dQw4w9WgXcQ".into(),
        ))));

        assert_eq!(
            app.display,
            Display::Error {
                chain: vec!["no transcript available for video dQw4w9WgXcQ".into()]
            }
        );
    }

    #[test]
    fn spinner_cycles() {
        let mut app = App::new();
        let first = app.spinner();
        for _ in 0..SPINNER.len() {
            app.tick();
        }
        assert_eq!(app.spinner(), first);
    }
}
