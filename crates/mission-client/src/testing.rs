//! Test doubles shared by the client tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use mission_core::{now_ms, CoreError, NewTask, Task, TaskId, TaskPatch};
use mission_server::http::create_router;
use mission_server::AppState;

use crate::api::TaskApi;
use crate::error::ClientError;

/// Start a server over in-memory stores on an ephemeral port.
pub(crate) async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(AppState::in_memory());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// In-process task API with switchable failures and a call log.
#[derive(Default)]
pub(crate) struct FakeApi {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl FakeApi {
    pub(crate) fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    /// Make every create, update and delete fail.
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn stored(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.calls.lock().unwrap().push("list".to_string());
        Ok(self.stored())
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        self.record(format!("create {}", task.title))?;
        let task = Task::create(task.clone(), now_ms())?;
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.record(format!("update {id}"))?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;
        task.apply(patch.clone(), now_ms());
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError> {
        self.record(format!("delete {id}"))?;
        self.tasks.lock().unwrap().retain(|t| &t.id != id);
        Ok(())
    }
}
