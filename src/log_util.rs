use crate::config;
use chrono::Utc;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

const LOG_DIRECTORY: &str = "output";
const LOG_FILENAME: &str = "drivetest-debug.log";

/// Append a timestamped line to the shared debug log. Errors are reported to stderr only.
pub fn log_debug(message: &str) {
    if !config::write_debug_log() {
        return;
    }
    if let Err(err) = append_line(&log_file_path(), message) {
        eprintln!("[drivetest::log_util] failed to write debug log: {}", err);
    }
}

pub fn log_file_path() -> PathBuf {
    PathBuf::from(LOG_DIRECTORY).join(LOG_FILENAME)
}

fn append_line(path: &Path, message: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "[{}] {}", Utc::now().to_rfc3339(), message)?;
    Ok(())
}
