//! Shared application state.

use std::sync::Arc;

use mission_core::{CalendarEvent, Task};

use crate::config::Config;
use crate::service::{CalendarService, TaskService};
use crate::store::{JsonFileStore, MemoryStore, Store};

/// Shared application state handed to every HTTP handler.
pub struct AppState {
    /// Task board operations.
    pub tasks: TaskService,

    /// Calendar operations.
    pub calendar: CalendarService,
}

impl AppState {
    /// Build state backed by the JSON files in the configured data directory.
    pub fn from_config(config: &Config) -> Arc<Self> {
        let tasks: Arc<dyn Store<Task>> = Arc::new(JsonFileStore::new(config.tasks_path()));
        let calendar: Arc<dyn Store<CalendarEvent>> =
            Arc::new(JsonFileStore::new(config.calendar_path()));
        Self::with_stores(tasks, calendar, config.serialize_writes)
    }

    /// Build state that keeps everything in memory.
    pub fn in_memory() -> Arc<Self> {
        Self::with_stores(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            false,
        )
    }

    /// Build state over arbitrary stores.
    pub fn with_stores(
        tasks: Arc<dyn Store<Task>>,
        calendar: Arc<dyn Store<CalendarEvent>>,
        serialize_writes: bool,
    ) -> Arc<Self> {
        let mut task_service = TaskService::new(tasks);
        let mut calendar_service = CalendarService::new(calendar);
        if serialize_writes {
            task_service = task_service.with_serialized_writes();
            calendar_service = calendar_service.with_serialized_writes();
        }

        Arc::new(Self {
            tasks: task_service,
            calendar: calendar_service,
        })
    }
}
