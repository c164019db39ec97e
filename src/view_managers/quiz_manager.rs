use crate::{
    App, AppView,
    log_util::log_debug,
    question_bank::{Category, Language},
    quiz_session::Advance,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Translates quiz-view key presses into session intents and selector changes.
pub(crate) struct QuizManager<'a> {
    app: &'a mut App,
}

impl<'a> QuizManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub(crate) fn show_quiz(app: &mut App) {
        app.view = AppView::Quiz;
        log_debug("App: opened quiz view");
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Down | KeyCode::Char('j')) => self.next_option(),
            (KeyModifiers::NONE, KeyCode::Up | KeyCode::Char('k')) => self.previous_option(),
            (KeyModifiers::NONE, KeyCode::Left | KeyCode::Char('h')) => {
                self.set_language(self.app.language.previous())
            }
            (KeyModifiers::NONE, KeyCode::Right | KeyCode::Char('l')) => {
                self.set_language(self.app.language.next())
            }
            (KeyModifiers::NONE, KeyCode::Tab) => self.set_category(self.app.category.next()),
            (_, KeyCode::BackTab) => self.set_category(self.app.category.previous()),
            (KeyModifiers::NONE, KeyCode::Enter | KeyCode::Char(' ')) => {
                if self.app.session.is_answered() {
                    self.advance();
                } else {
                    self.submit_highlighted();
                }
            }
            (_, KeyCode::Char('n') | KeyCode::Char('N')) => self.advance(),
            (KeyModifiers::NONE, KeyCode::Char(digit @ '1'..='9')) => {
                let index = digit as usize - '1' as usize;
                self.submit_option(index);
            }
            (KeyModifiers::NONE, KeyCode::Char('m')) => self.app.return_to_menu(),
            _ => {}
        }
    }

    pub(crate) fn set_language(&mut self, language: Language) {
        if language == self.app.language {
            return;
        }
        self.app.language = language;
        log_debug(&format!("App: switched language to {}", language.label()));
        self.app.reload_session();
    }

    pub(crate) fn set_category(&mut self, category: Category) {
        if category == self.app.category {
            return;
        }
        self.app.category = category;
        log_debug(&format!("App: switched category to {}", category.label()));
        self.app.reload_session();
    }

    pub(crate) fn next_option(&mut self) {
        let Some(option_len) = self.option_count() else {
            return;
        };
        self.app.option_index = (self.app.option_index + 1) % option_len;
    }

    pub(crate) fn previous_option(&mut self) {
        let Some(option_len) = self.option_count() else {
            return;
        };
        if self.app.option_index == 0 {
            self.app.option_index = option_len - 1;
        } else {
            self.app.option_index -= 1;
        }
    }

    pub(crate) fn submit_highlighted(&mut self) {
        self.submit_option(self.app.option_index);
    }

    pub(crate) fn submit_option(&mut self, index: usize) {
        let Some(question) = self.app.session.current_question() else {
            log_debug("App: answer ignored because no question is active");
            return;
        };
        let Some(answer) = question.answer_options.get(index).cloned() else {
            return;
        };
        let question_id = question.id;

        if self.app.session.submit_answer(&answer) {
            self.app.option_index = index;
            let correct = self.app.session.current_question().map(|q| q.correct_answer == answer);
            log_debug(&format!(
                "Session: answered question {} with option {} (correct: {})",
                question_id,
                index + 1,
                correct.unwrap_or(false)
            ));
        } else {
            log_debug(&format!(
                "Session: ignored repeat answer for question {}",
                question_id
            ));
        }
    }

    pub(crate) fn advance(&mut self) {
        match self.app.session.advance() {
            Advance::Ignored => {
                log_debug("Session: next question ignored until the current one is answered");
            }
            Advance::Next => {
                self.app.option_index = 0;
                log_debug(&format!(
                    "Session: moved to question {} of {}",
                    self.app.session.question_number(),
                    self.app.session.total_questions()
                ));
            }
            Advance::NewPass => {
                self.app.option_index = 0;
                self.app.status = Some(format!(
                    "All {} questions covered. Starting a new shuffled pass.",
                    self.app.session.total_questions()
                ));
                let order = self
                    .app
                    .session
                    .pending_ids()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                log_debug(&format!("Session: pass complete, new order [{}]", order));
            }
        }
    }

    fn option_count(&self) -> Option<usize> {
        let question = self.app.session.current_question()?;
        let option_len = question.answer_options.len();
        if option_len == 0 { None } else { Some(option_len) }
    }
}
