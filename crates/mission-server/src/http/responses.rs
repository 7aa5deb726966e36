//! HTTP request and response types.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use mission_core::{AssigneeFilter, CalendarPatch, CoreError, EventId, TaskId, TaskPatch};

// ============================================================================
// Request types
// ============================================================================

/// `?id=` query used by delete endpoints.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// Body of `PUT /tasks`: the target id plus the fields to merge.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub id: Option<TaskId>,

    #[serde(flatten)]
    pub patch: TaskPatch,
}

/// Body of `PUT /calendar`.
#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    pub id: Option<EventId>,

    #[serde(flatten)]
    pub patch: CalendarPatch,
}

/// Query for the HTML board page.
#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub assignee: AssigneeFilter,
}

// ============================================================================
// Response types
// ============================================================================

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response for successful deletes.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Error returned from handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl ApiError {
    /// 400 for a missing `id`.
    pub fn id_required() -> Self {
        Self(CoreError::validation("ID required"))
    }

    /// Status code for the wrapped error.
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoreError::Validation(_) => StatusCode::BAD_REQUEST,
            CoreError::TaskNotFound(_) | CoreError::EventNotFound(_) => StatusCode::NOT_FOUND,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "Invalid JSON in request body");
        Self(CoreError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        warn!(error = %rejection, "Invalid query string");
        Self(CoreError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
