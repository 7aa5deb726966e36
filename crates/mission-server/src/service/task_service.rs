//! Task CRUD and review-workflow updates.

use std::sync::Arc;

use tracing::{debug, info};

use mission_core::{now_ms, CoreError, NewTask, Task, TaskId, TaskPatch};

use crate::service::WriteGuard;
use crate::store::Store;

/// Applies task operations as read-modify-write cycles over a [`Store`].
///
/// Status values are only checked for membership. Any transition is
/// accepted; the review workflow is a client convention.
pub struct TaskService {
    store: Arc<dyn Store<Task>>,
    guard: WriteGuard,
}

impl TaskService {
    /// Create a service whose mutations may overlap.
    pub fn new(store: Arc<dyn Store<Task>>) -> Self {
        Self {
            store,
            guard: WriteGuard::disabled(),
        }
    }

    /// Run mutations one at a time.
    pub fn with_serialized_writes(mut self) -> Self {
        self.guard = WriteGuard::serialized();
        self
    }

    /// Returns true if mutations run one at a time.
    pub fn serializes_writes(&self) -> bool {
        self.guard.is_serialized()
    }

    /// All tasks, in store order.
    pub async fn list(&self) -> Result<Vec<Task>, CoreError> {
        Ok(self.store.load_all().await?)
    }

    /// Look up one task.
    pub async fn get(&self, id: &TaskId) -> Result<Task, CoreError> {
        self.store
            .load_all()
            .await?
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))
    }

    /// Create a task with a fresh id and append it.
    pub async fn create(&self, input: NewTask) -> Result<Task, CoreError> {
        let task = Task::create(input, now_ms())?;

        let _guard = self.guard.enter().await;
        let mut tasks = self.store.load_all().await?;
        tasks.push(task.clone());
        self.store.replace_all(&tasks).await?;

        info!(
            task_id = %task.id,
            status = %task.status,
            assignee = %task.assignee,
            "Task created"
        );
        Ok(task)
    }

    /// Merge a patch onto an existing task.
    pub async fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, CoreError> {
        patch.validate()?;

        let _guard = self.guard.enter().await;
        let mut tasks = self.store.load_all().await?;
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;

        let previous = task.status;
        task.apply(patch, now_ms());
        let updated = task.clone();
        self.store.replace_all(&tasks).await?;

        if previous != updated.status {
            info!(
                task_id = %id,
                from = %previous,
                to = %updated.status,
                "Task status changed"
            );
        } else {
            debug!(task_id = %id, "Task updated");
        }
        Ok(updated)
    }

    /// Remove a task. Unknown ids succeed without touching the store.
    pub async fn delete(&self, id: &TaskId) -> Result<(), CoreError> {
        let _guard = self.guard.enter().await;
        let mut tasks = self.store.load_all().await?;
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);

        if tasks.len() == before {
            debug!(task_id = %id, "Delete of unknown task ignored");
            return Ok(());
        }

        self.store.replace_all(&tasks).await?;
        info!(task_id = %id, "Task deleted");
        Ok(())
    }
}
