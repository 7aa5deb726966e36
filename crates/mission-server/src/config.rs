//! Server configuration.

use std::path::PathBuf;

/// File holding the task list inside the data directory.
pub const TASKS_FILE: &str = "tasks.json";

/// File holding calendar events inside the data directory.
pub const CALENDAR_FILE: &str = "calendar-events.json";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address.
    pub bind_addr: String,

    /// Directory holding the JSON data files.
    pub data_dir: PathBuf,

    /// Run mutations one at a time instead of letting concurrent
    /// read-modify-write cycles race.
    pub serialize_writes: bool,
}

impl Config {
    /// Path of the task list file.
    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE)
    }

    /// Path of the calendar events file.
    pub fn calendar_path(&self) -> PathBuf {
        self.data_dir.join(CALENDAR_FILE)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            data_dir: PathBuf::from("."),
            serialize_writes: false,
        }
    }
}
