//! HTTP request handlers.

mod board;
mod calendar;
mod health;
mod tasks;

pub use board::board_html;
pub use calendar::{create_event, delete_event, list_events, update_event};
pub use health::health_check;
pub use tasks::{create_task, delete_task, list_tasks, update_task};
