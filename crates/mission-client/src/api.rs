//! Task service port used by the board controller.

use async_trait::async_trait;

use mission_core::{NewTask, Task, TaskId, TaskPatch};

use crate::error::ClientError;

/// Operations the board needs from the task service.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Fetch the full task list.
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError>;

    /// Create a task.
    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError>;

    /// Merge a patch onto a task.
    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ClientError>;

    /// Delete a task. Unknown ids succeed.
    async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError>;
}
