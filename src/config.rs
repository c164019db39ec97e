use crate::question_bank::{Category, Language};
use color_eyre::eyre::{Context, Result, eyre};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::{
    env, fs, io,
    path::PathBuf,
    sync::{OnceLock, RwLock},
};

/// Globally accessible application configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_language_value")]
    pub default_language: Language,
    #[serde(default = "default_category_value")]
    pub default_category: Category,
    #[serde(default = "default_questions_dir_value")]
    pub questions_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
    #[serde(default = "default_write_debug_log_value")]
    pub write_debug_log: bool,
}

impl AppConfig {
    fn normalize(&mut self) {
        if self.questions_dir.trim().is_empty() {
            self.questions_dir = DEFAULT_QUESTIONS_DIR.to_string();
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_language: default_language_value(),
            default_category: default_category_value(),
            questions_dir: default_questions_dir_value(),
            shuffle_seed: None,
            write_debug_log: default_write_debug_log_value(),
        }
    }
}

const DEFAULT_QUESTIONS_DIR: &str = "questions";
const QUESTIONS_DIR_ENV: &str = "DRIVETEST_QUESTIONS_DIR";
const CONFIG_FILE_PATH: &str = "config/app_config.toml";

static APP_CONFIG: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn config_lock() -> &'static RwLock<AppConfig> {
    APP_CONFIG.get_or_init(|| RwLock::new(initial_config()))
}

#[cfg(not(test))]
fn initial_config() -> AppConfig {
    AppConfig::default()
}

// Unit tests never touch the shared debug log unless they install a config that asks for it.
#[cfg(test)]
fn initial_config() -> AppConfig {
    AppConfig {
        write_debug_log: false,
        ..AppConfig::default()
    }
}

/// Attempt to load configuration from disk. If loading fails, the in-memory config will be reset to defaults
/// and the error will be returned for the caller to surface if desired.
pub fn initialize() -> Result<()> {
    match load_config_from_disk() {
        Ok(loaded) => install(loaded),
        Err(err) => {
            install(AppConfig::default())?;
            Err(err)
        }
    }
}

/// Replace the in-memory configuration without writing it to disk.
pub fn install(config: AppConfig) -> Result<()> {
    let mut current = config_lock()
        .write()
        .map_err(|_| eyre!("config lock poisoned"))?;
    *current = config;
    Ok(())
}

/// Retrieve a clone of the current configuration.
pub fn current() -> AppConfig {
    config_lock()
        .read()
        .map(|config| config.clone())
        .unwrap_or_default()
}

/// Convenience accessor for the configured `write_debug_log` value.
pub fn write_debug_log() -> bool {
    config_lock()
        .read()
        .map(|config| config.write_debug_log)
        .unwrap_or(true)
}

/// Apply the provided mutation to the in-memory configuration and persist the result to disk.
pub fn update<F>(mutator: F) -> Result<AppConfig>
where
    F: FnOnce(&mut AppConfig),
{
    let lock = config_lock();
    let mut config = lock.write().map_err(|_| eyre!("config lock poisoned"))?;
    mutator(&mut config);
    config.normalize();
    save_config_to_disk(&config)?;
    Ok(config.clone())
}

/// Directory the question bank is read from. `DRIVETEST_QUESTIONS_DIR` wins over
/// the configured value for this run only and is never written back.
pub fn questions_dir(config: &AppConfig) -> PathBuf {
    resolve_questions_dir(&config.questions_dir, env::var(QUESTIONS_DIR_ENV).ok())
}

fn resolve_questions_dir(configured: &str, override_dir: Option<String>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(configured),
    }
}

/// Absolute path to the configuration file used for persistence.
pub fn config_file_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE_PATH)
}

/// Parse configuration TOML, filling in defaults for absent keys.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let mut config: AppConfig = toml::from_str(contents)?;
    config.normalize();
    Ok(config)
}

fn load_config_from_disk() -> Result<AppConfig> {
    let path = config_file_path();
    match fs::read_to_string(&path) {
        Ok(contents) => parse_config(&contents)
            .wrap_err_with(|| format!("failed to parse configuration at {}", path.display())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(err) => Err(eyre!(format!(
            "failed to read configuration at {}: {}",
            path.display(),
            err
        ))),
    }
}

fn save_config_to_disk(config: &AppConfig) -> Result<()> {
    let path = config_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).wrap_err_with(|| {
            format!(
                "failed to create configuration directory {}",
                parent.display()
            )
        })?;
    }
    let serialized =
        toml::to_string_pretty(config).wrap_err("failed to serialize configuration to TOML")?;
    fs::write(&path, serialized)
        .wrap_err_with(|| format!("failed to write configuration to {}", path.display()))
}

const fn default_language_value() -> Language {
    Language::Ar
}

const fn default_category_value() -> Category {
    Category::All
}

fn default_questions_dir_value() -> String {
    DEFAULT_QUESTIONS_DIR.to_string()
}

const fn default_write_debug_log_value() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigField {
    Language,
    Category,
    DebugLog,
}

/// Requests from the config view that reach beyond the form itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigCommand {
    /// Persist the edited defaults.
    Save,
    /// Start a quiz with the edited language and category without saving.
    ApplyNow,
    /// Throw away edits and show the saved values again.
    Revert,
    Leave,
}

#[derive(Debug, Clone)]
pub struct ConfigForm {
    pub(crate) default_language: Language,
    pub(crate) default_category: Category,
    pub(crate) write_debug_log: bool,
    field: ConfigField,
    pub(crate) dirty: bool,
    pub(crate) status: Option<String>,
}

impl ConfigForm {
    pub(crate) fn from_config(config: AppConfig) -> Self {
        Self {
            default_language: config.default_language,
            default_category: config.default_category,
            write_debug_log: config.write_debug_log,
            field: ConfigField::Language,
            dirty: false,
            status: None,
        }
    }

    pub(crate) fn selected_index(&self) -> usize {
        self.field.index()
    }

    /// Field navigation and value cycling stay inside the form; anything else
    /// is handed back as a [`ConfigCommand`].
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Option<ConfigCommand> {
        if key.modifiers != KeyModifiers::NONE {
            return None;
        }
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.field = self.field.next(),
            KeyCode::Up | KeyCode::Char('k') => self.field = self.field.previous(),
            KeyCode::Left | KeyCode::Char('h') => self.adjust_current(-1),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.adjust_current(1),
            KeyCode::Char('s') | KeyCode::Enter => return Some(ConfigCommand::Save),
            KeyCode::Char('a') => return Some(ConfigCommand::ApplyNow),
            KeyCode::Char('r') => return Some(ConfigCommand::Revert),
            KeyCode::Char('m') => return Some(ConfigCommand::Leave),
            _ => {}
        }
        None
    }

    /// Copy the edited values onto `config`, leaving fields the form does not
    /// show untouched.
    pub(crate) fn write_into(&self, config: &mut AppConfig) {
        config.default_language = self.default_language;
        config.default_category = self.default_category;
        config.write_debug_log = self.write_debug_log;
    }

    fn adjust_current(&mut self, delta: isize) {
        if delta == 0 {
            return;
        }

        match self.field {
            ConfigField::Language => {
                self.default_language = if delta > 0 {
                    self.default_language.next()
                } else {
                    self.default_language.previous()
                };
            }
            ConfigField::Category => {
                self.default_category = if delta > 0 {
                    self.default_category.next()
                } else {
                    self.default_category.previous()
                };
            }
            ConfigField::DebugLog => {
                self.write_debug_log = !self.write_debug_log;
            }
        }
        self.dirty = true;
        self.status = None;
    }

    pub(crate) fn apply_saved(&mut self, config: AppConfig) {
        self.default_language = config.default_language;
        self.default_category = config.default_category;
        self.write_debug_log = config.write_debug_log;
        self.dirty = false;
        self.status = None;
    }

    pub(crate) fn set_status<S: Into<String>>(&mut self, status: S) {
        self.status = Some(status.into());
    }
}

impl ConfigField {
    fn index(self) -> usize {
        match self {
            Self::Language => 0,
            Self::Category => 1,
            Self::DebugLog => 2,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Language => Self::Category,
            Self::Category => Self::DebugLog,
            Self::DebugLog => Self::Language,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Language => Self::DebugLog,
            Self::Category => Self::Language,
            Self::DebugLog => Self::Category,
        }
    }
}
