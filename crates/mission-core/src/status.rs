//! Status and ownership enums for board tasks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, Task};

/// Column a task sits in on the board.
///
/// The service accepts any value here; the workflow edges returned by
/// [`TaskStatus::workflow_next`] are advisory and only drive client affordances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Backlog,
    /// Being worked on.
    InProgress,
    /// Submitted and waiting for a human decision.
    InReview,
    /// Approved.
    Done,
}

impl TaskStatus {
    /// Board columns, left to right.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Backlog,
        TaskStatus::InProgress,
        TaskStatus::InReview,
        TaskStatus::Done,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in_progress",
            Self::InReview => "in_review",
            Self::Done => "done",
        }
    }

    /// Column heading.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::InProgress => "In Progress",
            Self::InReview => "In Review",
            Self::Done => "Done",
        }
    }

    /// Intended next states in the review workflow.
    pub fn workflow_next(&self) -> &'static [TaskStatus] {
        match self {
            Self::Backlog => &[Self::InProgress],
            Self::InProgress => &[Self::InReview],
            Self::InReview => &[Self::Done, Self::InProgress],
            Self::Done => &[],
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::validation(format!("unknown status '{s}'")))
    }
}

/// One of the two fixed identities that own tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignee {
    /// The person running the board.
    #[default]
    Human,
    /// The automated assistant persona.
    Agent,
}

impl Assignee {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Agent => "agent",
        }
    }
}

impl fmt::Display for Assignee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Assignee {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Self::Human),
            "agent" => Ok(Self::Agent),
            other => Err(CoreError::validation(format!("unknown assignee '{other}'"))),
        }
    }
}

/// Client-side view filter over assignees. Never sent to the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeFilter {
    #[default]
    All,
    Human,
    Agent,
}

impl AssigneeFilter {
    /// Check whether a task passes this filter.
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Human => task.assignee == Assignee::Human,
            Self::Agent => task.assignee == Assignee::Agent,
        }
    }
}

impl fmt::Display for AssigneeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::All => "all",
            Self::Human => "human",
            Self::Agent => "agent",
        })
    }
}

impl FromStr for AssigneeFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            other => other.parse::<Assignee>().map(Self::from),
        }
    }
}

impl From<Assignee> for AssigneeFilter {
    fn from(assignee: Assignee) -> Self {
        match assignee {
            Assignee::Human => Self::Human,
            Assignee::Agent => Self::Agent,
        }
    }
}
