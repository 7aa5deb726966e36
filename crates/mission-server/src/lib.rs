//! Mission Control Server Library
//!
//! This crate provides the task board and calendar backend: flat JSON
//! stores, the services that apply CRUD and review-workflow updates, and
//! the HTTP surface.

pub mod config;
pub mod http;
pub mod service;
pub mod state;
pub mod store;

pub use config::Config;
pub use service::{CalendarService, TaskService};
pub use state::AppState;
pub use store::{JsonFileStore, MemoryStore, Store, StoreError};
