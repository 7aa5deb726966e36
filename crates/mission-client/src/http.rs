//! HTTP client for the REST endpoints.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mission_core::{
    CalendarEvent, CalendarPatch, CalendarQuery, EventId, NewCalendarEvent, NewTask, Task, TaskId,
    TaskPatch,
};

use crate::api::TaskApi;
use crate::error::ClientError;

/// Body of a `PUT`: the target id next to the fields to merge.
#[derive(Serialize)]
struct UpdateBody<'a, P> {
    id: &'a str,
    #[serde(flatten)]
    patch: &'a P,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the task and calendar API.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check if the server is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = self.url("/health");
        debug!(url = %url, "Checking health");

        let response = self.inner.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    /// List calendar events matching the query.
    pub async fn list_events(
        &self,
        query: &CalendarQuery,
    ) -> Result<Vec<CalendarEvent>, ClientError> {
        let url = self.url("/calendar");
        debug!(url = %url, ?query, "GET request");
        let response = self.inner.get(&url).query(query).send().await?;
        decode(response).await
    }

    /// Create a calendar event.
    pub async fn create_event(
        &self,
        event: &NewCalendarEvent,
    ) -> Result<CalendarEvent, ClientError> {
        let url = self.url("/calendar");
        debug!(url = %url, "POST request");
        let response = self.inner.post(&url).json(event).send().await?;
        decode(response).await
    }

    /// Merge a patch onto a calendar event.
    pub async fn update_event(
        &self,
        id: &EventId,
        patch: &CalendarPatch,
    ) -> Result<CalendarEvent, ClientError> {
        let url = self.url("/calendar");
        debug!(url = %url, event_id = %id, "PUT request");
        let body = UpdateBody {
            id: id.as_str(),
            patch,
        };
        let response = self.inner.put(&url).json(&body).send().await?;
        decode(response).await
    }

    /// Delete a calendar event.
    pub async fn delete_event(&self, id: &EventId) -> Result<(), ClientError> {
        self.delete("/calendar", id.as_str()).await
    }

    async fn delete(&self, path: &str, id: &str) -> Result<(), ClientError> {
        let url = self.url(path);
        debug!(url = %url, id = %id, "DELETE request");
        let response = self.inner.delete(&url).query(&[("id", id)]).send().await?;
        check(response).await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl TaskApi for HttpClient {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let url = self.url("/tasks");
        debug!(url = %url, "GET request");
        let response = self.inner.get(&url).send().await?;
        decode(response).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        let url = self.url("/tasks");
        debug!(url = %url, "POST request");
        let response = self.inner.post(&url).json(task).send().await?;
        decode(response).await
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ClientError> {
        let url = self.url("/tasks");
        debug!(url = %url, task_id = %id, "PUT request");
        let body = UpdateBody {
            id: id.as_str(),
            patch,
        };
        let response = self.inner.put(&url).json(&body).send().await?;
        decode(response).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError> {
        self.delete("/tasks", id.as_str()).await
    }
}

/// Turn non-2xx responses into errors carrying the server's message.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };
    if status == StatusCode::NOT_FOUND {
        Err(ClientError::NotFound(message))
    } else {
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    Ok(check(response).await?.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_core::{Assignee, ReviewDecision, ReviewDraft, TaskStatus};

    use crate::testing::spawn_server;

    #[tokio::test]
    async fn test_health() {
        let client = HttpClient::new(&spawn_server().await);
        assert!(client.health().await.unwrap());
    }

    #[tokio::test]
    async fn test_task_lifecycle_over_http() {
        let client = HttpClient::new(&spawn_server().await);

        let task = client
            .create_task(&NewTask::new("Summarize inbox").with_assignee(Assignee::Agent))
            .await
            .unwrap();
        assert_eq!(task.created_at, task.updated_at);

        client.update_task(&task.id, &TaskPatch::start()).await.unwrap();
        client
            .update_task(&task.id, &TaskPatch::submit_for_review())
            .await
            .unwrap();

        let mut draft = ReviewDraft::new(task.id.clone());
        draft.select(ReviewDecision::Reject).set_feedback("fix X");
        let (id, patch) = draft.into_patch().unwrap();
        let rejected = client.update_task(&id, &patch).await.unwrap();
        assert_eq!(rejected.status, TaskStatus::InProgress);
        assert_eq!(rejected.review_notes.as_deref(), Some("fix X"));

        let approved = client.update_task(&id, &TaskPatch::approve()).await.unwrap();
        assert_eq!(approved.status, TaskStatus::Done);
        assert_eq!(approved.review_notes, None);

        client.delete_task(&task.id).await.unwrap();
        assert!(client.list_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let base = spawn_server().await;
        let client = HttpClient::new(&base);

        let err = client.create_task(&NewTask::new("")).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 400, .. }));

        let err = client
            .update_task(&TaskId::new("ghost"), &TaskPatch::start())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));

        // Deleting an unknown id still succeeds.
        client.delete_task(&TaskId::new("ghost")).await.unwrap();

        let raw = reqwest::Client::new();
        let missing_id = raw
            .put(format!("{base}/tasks"))
            .json(&serde_json::json!({ "status": "done" }))
            .send()
            .await
            .unwrap();
        assert_eq!(missing_id.status(), StatusCode::BAD_REQUEST);

        let missing_query = raw.delete(format!("{base}/tasks")).send().await.unwrap();
        assert_eq!(missing_query.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = missing_query.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("ID required"));

        let created = raw
            .post(format!("{base}/tasks"))
            .json(&serde_json::json!({ "title": "raw" }))
            .send()
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_unknown_enum_values_are_bad_requests() {
        let base = spawn_server().await;
        let raw = reqwest::Client::new();

        let bad_status = raw
            .post(format!("{base}/tasks"))
            .json(&serde_json::json!({ "title": "t", "status": "archived" }))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = bad_status.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("archived"));

        let bad_assignee = raw
            .put(format!("{base}/tasks"))
            .json(&serde_json::json!({ "id": "t1", "assignee": "bob" }))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_assignee.status(), StatusCode::BAD_REQUEST);

        let bad_type = raw
            .post(format!("{base}/calendar"))
            .json(&serde_json::json!({ "title": "e", "date": "2024-03-01", "type": "meeting" }))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_type.status(), StatusCode::BAD_REQUEST);

        let bad_filter = raw
            .get(format!("{base}/ui/tasks?assignee=bob"))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_filter.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = bad_filter.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_delete_response_body() {
        let base = spawn_server().await;
        let response = reqwest::Client::new()
            .delete(format!("{base}/tasks?id=unknown"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_calendar_over_http() {
        let client = HttpClient::new(&spawn_server().await);

        for date in ["2024-05-31", "2024-06-03", "2024-06-20"] {
            client
                .create_event(&NewCalendarEvent::new("sync", date))
                .await
                .unwrap();
        }

        let june = client
            .list_events(&CalendarQuery::month("2024-06"))
            .await
            .unwrap();
        assert_eq!(june.len(), 2);

        let range = client
            .list_events(&CalendarQuery::range("2024-05-31", "2024-06-03"))
            .await
            .unwrap();
        let dates: Vec<_> = range.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-05-31", "2024-06-03"]);

        let patch = CalendarPatch {
            title: Some("retro".to_string()),
            ..CalendarPatch::default()
        };
        let updated = client.update_event(&june[0].id, &patch).await.unwrap();
        assert_eq!(updated.title, "retro");

        client.delete_event(&june[0].id).await.unwrap();
        let all = client.list_events(&CalendarQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let err = client
            .update_event(&EventId::new("ghost"), &patch)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_board_page_renders() {
        let base = spawn_server().await;
        let client = HttpClient::new(&base);
        client
            .create_task(&NewTask::new("Visible on the board"))
            .await
            .unwrap();

        let page = reqwest::get(format!("{base}/ui/tasks?assignee=human"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("Visible on the board"));
        assert!(page.contains("Task Board - 1 tasks"));
    }
}
