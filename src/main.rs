mod config;
mod log_util;
mod question_bank;
mod quiz_session;
mod ui_renderer;
mod view_managers;

use color_eyre::Result;
use config::{AppConfig, ConfigForm};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use dotenvy::dotenv;
use log_util::log_debug;
use question_bank::{Category, Language, QuestionBank, QuestionRepository};
use quiz_session::QuizSession;
use ratatui::{DefaultTerminal, Frame};
use std::{path::PathBuf, time::Duration};
use ui_renderer::UiRenderer;
use view_managers::{ConfigManager, MenuManager, QuizManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppView {
    Menu,
    Quiz,
    Config,
}

fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = App::new().run(terminal);
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    pub(crate) running: bool,
    /// Current view being displayed.
    pub(crate) view: AppView,
    /// Currently selected index in the main menu.
    pub(crate) menu_index: usize,
    /// Questions for every supported language.
    pub(crate) bank: QuestionBank,
    /// Directory the question bank was read from.
    pub(crate) questions_dir: PathBuf,
    /// Language whose questions are in play.
    pub(crate) language: Language,
    /// Category filter applied to the active language.
    pub(crate) category: Category,
    /// Quiz state for the current language and category.
    pub(crate) session: QuizSession,
    /// Fixed shuffle seed, if configured.
    pub(crate) shuffle_seed: Option<u64>,
    /// Highlighted answer option in the quiz view.
    pub(crate) option_index: usize,
    /// Any error encountered while loading files or parsing configuration.
    pub(crate) error: Option<String>,
    /// Latest informational message for the status panel.
    pub(crate) status: Option<String>,
    /// Holds the editable configuration state when rendering the config view.
    pub(crate) config_form: ConfigForm,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new() -> Self {
        let mut aggregated_error: Option<String> = None;

        if let Err(err) = config::initialize() {
            Self::push_error(
                &mut aggregated_error,
                format!("Configuration load failed: {:#}", err),
            );
        }
        let config = config::current();

        let load = QuestionBank::load_dir(config::questions_dir(&config));
        if let Some(error) = load.error {
            Self::push_error(&mut aggregated_error, error);
        }

        let mut app = Self::with_bank(load.bank, load.directory, config);
        app.error = aggregated_error;
        app
    }

    /// Build an [`App`] around an already loaded bank, starting a session for
    /// the configured default language and category.
    pub(crate) fn with_bank(bank: QuestionBank, questions_dir: PathBuf, config: AppConfig) -> Self {
        let mut app = Self {
            running: false,
            view: AppView::Menu,
            menu_index: 0,
            bank,
            questions_dir,
            language: config.default_language,
            category: config.default_category,
            session: QuizSession::default(),
            shuffle_seed: config.shuffle_seed,
            option_index: 0,
            error: None,
            status: None,
            config_form: ConfigForm::from_config(config),
        };
        app.reload_session();
        app
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        let tick_rate = Duration::from_millis(120);
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events(tick_rate)?;
        }
        Ok(())
    }

    /// Dispatch rendering based on the active view.
    fn render(&mut self, frame: &mut Frame) {
        UiRenderer::new(self).render(frame);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self, tick_rate: Duration) -> Result<()> {
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(_) => {}
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    pub(crate) fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            _ => match self.view {
                AppView::Menu => MenuManager::new(self).handle_key(key),
                AppView::Quiz => QuizManager::new(self).handle_key(key),
                AppView::Config => ConfigManager::new(self).handle_key(key),
            },
        }
    }

    /// Replace the session with a fresh one built from the active language
    /// and category. Nothing from the previous session carries over, including
    /// its status message.
    pub(crate) fn reload_session(&mut self) {
        let questions = self.bank.questions_for(self.language, self.category);
        let pool_size = questions.len();
        self.session = match self.shuffle_seed {
            Some(seed) => QuizSession::reset_seeded(questions, seed),
            None => QuizSession::reset(questions),
        };
        self.option_index = 0;
        self.status = None;
        log_debug(&format!(
            "Session: reset for {} / {} with {} question(s)",
            self.language.label(),
            self.category.label(),
            pool_size
        ));
    }

    pub(crate) fn return_to_menu(&mut self) {
        if matches!(self.view, AppView::Config) {
            self.config_form = ConfigForm::from_config(config::current());
        }
        self.view = AppView::Menu;
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }

    /// Append a message to an optional error slot.
    pub(crate) fn push_error(slot: &mut Option<String>, message: String) {
        if let Some(existing) = slot {
            existing.push_str(" | ");
            existing.push_str(&message);
        } else {
            *slot = Some(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question_bank::Question;
    use std::collections::HashMap;

    pub(crate) fn question(id: u32, category: &str, correct: &str) -> Question {
        Question {
            id,
            category: category.to_string(),
            prompt: format!("prompt {id}"),
            answer_options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_answer: correct.to_string(),
        }
    }

    pub(crate) fn test_app() -> App {
        let mut by_language = HashMap::new();
        by_language.insert(
            Language::En,
            vec![
                question(1, "Signs", "A"),
                question(2, "Law", "B"),
                question(3, "Safety", "C"),
            ],
        );
        by_language.insert(Language::Fr, vec![question(10, "Law", "A")]);
        let config = AppConfig {
            default_language: Language::En,
            shuffle_seed: Some(7),
            write_debug_log: false,
            ..AppConfig::default()
        };
        config::install(config.clone()).unwrap();
        App::with_bank(
            QuestionBank::from_questions(by_language),
            PathBuf::from("questions"),
            config,
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn starts_on_menu_with_configured_selection() {
        let app = test_app();
        assert_eq!(app.view, AppView::Menu);
        assert_eq!(app.language, Language::En);
        assert_eq!(app.category, Category::All);
        assert_eq!(app.session.total_questions(), 3);
        assert_eq!(app.session.question_number(), 1);
    }

    #[test]
    fn quit_keys_stop_the_loop() {
        let mut app = test_app();
        app.running = true;
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);

        app.running = true;
        app.on_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn reload_discards_previous_progress() {
        let mut app = test_app();
        let correct = app
            .session
            .current_question()
            .map(|q| q.correct_answer.clone())
            .unwrap();
        app.session.submit_answer(&correct);
        app.option_index = 2;
        assert_eq!(app.session.correct_count(), 1);
        app.status = Some("All 3 questions covered.".to_string());

        app.reload_session();

        assert!(app.status.is_none());
        assert_eq!(app.session.correct_count(), 0);
        assert!(!app.session.is_answered());
        assert_eq!(app.option_index, 0);
    }

    #[test]
    fn missing_language_yields_idle_session() {
        let mut app = test_app();
        app.language = Language::Ar;
        app.reload_session();
        assert_eq!(app.session.total_questions(), 0);
        assert!(app.session.current_question().is_none());
    }

    #[test]
    fn push_error_joins_messages() {
        let mut slot = None;
        App::push_error(&mut slot, "first".to_string());
        App::push_error(&mut slot, "second".to_string());
        assert_eq!(slot.as_deref(), Some("first | second"));
    }
}
