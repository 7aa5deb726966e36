//! Two-step review decisions for tasks in `in_review`.

use serde::{Deserialize, Serialize};

use crate::patch::non_blank;
use crate::{CoreError, TaskId, TaskPatch};

/// Feedback recorded when a reviewer rejects without writing anything.
pub const DEFAULT_REJECTION_NOTE: &str = "Needs revision";

/// Outcome the reviewer picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// A review in progress: first a decision is selected, then (for a
/// rejection) feedback is written, then the draft is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    task_id: TaskId,
    decision: Option<ReviewDecision>,
    feedback: String,
}

impl ReviewDraft {
    /// Open a review for a task with nothing selected.
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            decision: None,
            feedback: String::new(),
        }
    }

    /// Select approve or reject. Can be changed until submission.
    pub fn select(&mut self, decision: ReviewDecision) -> &mut Self {
        self.decision = Some(decision);
        self
    }

    /// Set the free-text feedback. Ignored when approving.
    pub fn set_feedback(&mut self, feedback: impl Into<String>) -> &mut Self {
        self.feedback = feedback.into();
        self
    }

    /// Task under review.
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Selected decision, if any.
    pub fn decision(&self) -> Option<ReviewDecision> {
        self.decision
    }

    /// Turn the draft into the update it stands for.
    ///
    /// Fails if no decision was selected.
    pub fn into_patch(self) -> Result<(TaskId, TaskPatch), CoreError> {
        let patch = match self.decision {
            None => return Err(CoreError::validation("no review decision selected")),
            Some(ReviewDecision::Approve) => TaskPatch::approve(),
            Some(ReviewDecision::Reject) if non_blank(&self.feedback) => {
                TaskPatch::reject(self.feedback)
            }
            Some(ReviewDecision::Reject) => TaskPatch::reject(DEFAULT_REJECTION_NOTE),
        };
        Ok((self.task_id, patch))
    }
}
