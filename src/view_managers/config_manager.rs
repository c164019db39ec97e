use super::quiz_manager::QuizManager;
use crate::{
    App, AppView,
    config::{self, ConfigCommand, ConfigForm},
    log_util::log_debug,
};
use crossterm::event::KeyEvent;

/// Edits the startup defaults and can start a quiz from them straight away.
pub(crate) struct ConfigManager<'a> {
    app: &'a mut App,
}

impl<'a> ConfigManager<'a> {
    pub(crate) fn new(app: &'a mut App) -> Self {
        Self { app }
    }

    pub(crate) fn show_config(&mut self) {
        let mut form = ConfigForm::from_config(config::current());
        form.set_status("s saves the defaults, a plays them now without saving.");
        self.app.config_form = form;
        self.app.view = AppView::Config;
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        let Some(command) = self.app.config_form.handle_key(key) else {
            return;
        };
        match command {
            ConfigCommand::Save => self.save_defaults(),
            ConfigCommand::ApplyNow => self.play_with_form_selection(),
            ConfigCommand::Revert => {
                self.app.config_form.apply_saved(config::current());
                self.app.config_form.set_status("Showing the saved defaults again.");
            }
            ConfigCommand::Leave => self.app.return_to_menu(),
        }
    }

    fn save_defaults(&mut self) {
        let form = &mut self.app.config_form;
        if !form.dirty {
            form.set_status("Nothing changed since the last save.");
            return;
        }

        let edited = form.clone();
        match config::update(|config| edited.write_into(config)) {
            Ok(saved) => {
                log_debug(&format!(
                    "App: saved defaults {} / {} (debug log: {})",
                    saved.default_language.label(),
                    saved.default_category.label(),
                    saved.write_debug_log
                ));
                form.apply_saved(saved);
                form.set_status(format!(
                    "Defaults written to {}. They apply on the next launch.",
                    config::config_file_path().display()
                ));
            }
            Err(err) => {
                form.set_status("Defaults were not saved. See the error line.");
                log_debug(&format!("App: saving defaults failed: {:#}", err));
                App::push_error(
                    &mut self.app.error,
                    format!("Could not save defaults: {:#}", err),
                );
            }
        }
    }

    /// Switch the running quiz to the form's language and category. The saved
    /// defaults stay as they are.
    fn play_with_form_selection(&mut self) {
        let language = self.app.config_form.default_language;
        let category = self.app.config_form.default_category;
        if language != self.app.language || category != self.app.category {
            self.app.language = language;
            self.app.category = category;
            self.app.reload_session();
        }
        log_debug(&format!(
            "App: playing {} / {} from the config view",
            language.label(),
            category.label()
        ));
        QuizManager::show_quiz(self.app);
    }
}
