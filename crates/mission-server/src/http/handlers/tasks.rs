//! Task board handlers.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use mission_core::{NewTask, Task, TaskId};

use crate::http::responses::{ApiError, IdQuery, SuccessResponse, UpdateTaskRequest};
use crate::state::AppState;

/// List every task.
///
/// GET /tasks
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.tasks.list().await?))
}

/// Create a task.
///
/// POST /tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewTask>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let task = state.tasks.create(req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Merge fields onto the task named by `id` in the body.
///
/// PUT /tasks
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(req) = body?;
    let id = req.id.ok_or_else(ApiError::id_required)?;
    Ok(Json(state.tasks.update(&id, req.patch).await?))
}

/// Delete a task. Unknown ids still succeed.
///
/// DELETE /tasks?id=
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Query(query) = query?;
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(ApiError::id_required)?;
    state.tasks.delete(&TaskId::new(id)).await?;
    Ok(Json(SuccessResponse::ok()))
}
