//! Services that apply board and calendar operations over their stores.

mod calendar_service;
mod task_service;
mod write_guard;

pub use calendar_service::CalendarService;
pub use task_service::TaskService;
pub(crate) use write_guard::WriteGuard;
