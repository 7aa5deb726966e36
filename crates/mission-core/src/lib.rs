//! Mission Control Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Storage
//! - Runtime specifics
//!
//! All types here represent the task board, review workflow and calendar
//! of Mission Control.

pub mod activity;
pub mod calendar;
pub mod error;
pub mod ids;
mod patch;
pub mod review;
pub mod status;
pub mod task;

// Re-export commonly used types
pub use activity::AgentActivity;
pub use calendar::{
    CalendarEvent, CalendarPatch, CalendarQuery, EventType, NewCalendarEvent, Recurrence,
};
pub use error::CoreError;
pub use ids::{EventId, TaskId};
pub use review::{ReviewDecision, ReviewDraft, DEFAULT_REJECTION_NOTE};
pub use status::{Assignee, AssigneeFilter, TaskStatus};
pub use task::{now_ms, NewTask, Task, TaskPatch};
