//! Task records, creation input and partial updates.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::patch::{non_blank, nullable};
use crate::{Assignee, CoreError, TaskId, TaskStatus};

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// A unit of trackable work on the board.
///
/// Stores keep tasks in no particular order. Any ordering a client shows
/// within a column is presentation-only and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier, never reused.
    pub id: TaskId,

    /// Display title, never empty.
    pub title: String,

    /// Optional free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Board column.
    pub status: TaskStatus,

    /// Who owns the task.
    pub assignee: Assignee,

    /// Feedback from a rejected review. Always absent once done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,

    /// Creation time (epoch ms).
    pub created_at: i64,

    /// Last mutation time (epoch ms), never before `created_at`.
    pub updated_at: i64,
}

impl Task {
    /// Build a task from creation input.
    ///
    /// Fails if the title is empty or only whitespace.
    pub fn create(input: NewTask, now: i64) -> Result<Self, CoreError> {
        if !non_blank(&input.title) {
            return Err(CoreError::validation("title is required"));
        }

        let mut task = Self {
            id: TaskId::generate(),
            title: input.title,
            description: input.description,
            status: input.status,
            assignee: input.assignee,
            review_notes: input.review_notes,
            created_at: now,
            updated_at: now,
        };
        task.enforce_done_clears_notes();
        Ok(task)
    }

    /// Shallow-merge a patch onto this task and refresh `updated_at`.
    ///
    /// Whenever the resulting status is `done` the review notes are dropped,
    /// whatever the patch says.
    pub fn apply(&mut self, patch: TaskPatch, now: i64) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(review_notes) = patch.review_notes {
            self.review_notes = review_notes;
        }
        self.enforce_done_clears_notes();
        self.updated_at = now.max(self.updated_at);
    }

    /// Check if the task is waiting for a review decision.
    pub fn awaiting_review(&self) -> bool {
        self.status == TaskStatus::InReview
    }

    fn enforce_done_clears_notes(&mut self) {
        if self.status == TaskStatus::Done {
            self.review_notes = None;
        }
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub assignee: Assignee,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl NewTask {
    /// Create input with the given title, in the backlog, owned by the human.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            assignee: Assignee::default(),
            review_notes: None,
        }
    }

    /// Builder method to set a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the initial status.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method to set the assignee.
    pub fn with_assignee(mut self, assignee: Assignee) -> Self {
        self.assignee = assignee;
        self
    }
}

/// Partial update for a task.
///
/// Absent fields are left unchanged. For the optional fields an explicit
/// `null` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Assignee>,

    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub review_notes: Option<Option<String>>,
}

impl TaskPatch {
    /// Move to another column, leaving everything else alone.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// `backlog -> in_progress`.
    pub fn start() -> Self {
        Self::status(TaskStatus::InProgress)
    }

    /// `in_progress -> in_review`. Entering review always clears old feedback.
    pub fn submit_for_review() -> Self {
        Self {
            status: Some(TaskStatus::InReview),
            review_notes: Some(None),
            ..Self::default()
        }
    }

    /// `in_review -> done`, clearing feedback.
    pub fn approve() -> Self {
        Self {
            status: Some(TaskStatus::Done),
            review_notes: Some(None),
            ..Self::default()
        }
    }

    /// `in_review -> in_progress` with the reviewer's feedback.
    pub fn reject(feedback: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::InProgress),
            review_notes: Some(Some(feedback.into())),
            ..Self::default()
        }
    }

    /// Check the patch against field rules that don't need the stored record.
    pub fn validate(&self) -> Result<(), CoreError> {
        match &self.title {
            Some(title) if !non_blank(title) => Err(CoreError::validation("title cannot be empty")),
            _ => Ok(()),
        }
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
