//! Summary of what the agent is working on.

use crate::{Assignee, Task, TaskStatus};

/// The agent's open work, split by column.
///
/// Done tasks are left out; `in_review` doubles as the queue of tasks
/// waiting for a human decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentActivity {
    pub in_progress: Vec<Task>,
    pub in_review: Vec<Task>,
    pub backlog: Vec<Task>,
}

impl AgentActivity {
    /// Build the summary from a full task list, keeping list order.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut activity = Self::default();
        for task in tasks.iter().filter(|t| t.assignee == Assignee::Agent) {
            match task.status {
                TaskStatus::InProgress => activity.in_progress.push(task.clone()),
                TaskStatus::InReview => activity.in_review.push(task.clone()),
                TaskStatus::Backlog => activity.backlog.push(task.clone()),
                TaskStatus::Done => {}
            }
        }
        activity
    }

    /// Tasks a human needs to approve or reject.
    pub fn awaiting_review(&self) -> &[Task] {
        &self.in_review
    }

    /// Number of open agent tasks.
    pub fn open_count(&self) -> usize {
        self.in_progress.len() + self.in_review.len() + self.backlog.len()
    }

    /// Returns true if the agent has something in flight or queued.
    pub fn has_focus(&self) -> bool {
        !self.in_progress.is_empty() || !self.backlog.is_empty()
    }
}
