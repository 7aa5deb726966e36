//! Calendar handlers.

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

use mission_core::{CalendarEvent, CalendarQuery, EventId, NewCalendarEvent};

use crate::http::responses::{ApiError, IdQuery, SuccessResponse, UpdateEventRequest};
use crate::state::AppState;

/// List events, optionally filtered by month or date range.
///
/// GET /calendar?month=YYYY-MM | ?start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn list_events(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.calendar.list(&query).await?))
}

/// Create an event.
///
/// POST /calendar
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewCalendarEvent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let event = state.calendar.create(req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Merge fields onto the event named by `id` in the body.
///
/// PUT /calendar
pub async fn update_event(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let Json(req) = body?;
    let id = req.id.ok_or_else(ApiError::id_required)?;
    Ok(Json(state.calendar.update(&id, req.patch).await?))
}

/// Delete an event. Unknown ids still succeed.
///
/// DELETE /calendar?id=
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Query(query) = query?;
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(ApiError::id_required)?;
    state.calendar.delete(&EventId::new(id)).await?;
    Ok(Json(SuccessResponse::ok()))
}
