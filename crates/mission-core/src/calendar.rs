//! Calendar events and date filtering.

use serde::{Deserialize, Serialize};

use crate::patch::{non_blank, nullable};
use crate::{Assignee, CoreError, EventId};

/// What kind of entry a calendar event is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Mirrors a scheduled job.
    Cron,
    #[default]
    Task,
    Reminder,
}

/// Repeat cadence of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
}

/// A dated entry on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Assignee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Recurrence>,
    /// Scheduled job this event mirrors, for `cron` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CalendarEvent {
    /// Build an event from creation input. Title and date are required.
    pub fn create(input: NewCalendarEvent, now: i64) -> Result<Self, CoreError> {
        if !non_blank(&input.title) {
            return Err(CoreError::validation("title is required"));
        }
        if !non_blank(&input.date) {
            return Err(CoreError::validation("date is required"));
        }

        Ok(Self {
            id: EventId::generate(),
            title: input.title,
            description: input.description,
            date: input.date,
            time: input.time,
            end_time: input.end_time,
            kind: input.kind,
            assignee: input.assignee,
            recurring: input.recurring,
            cron_id: input.cron_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Shallow-merge a patch and refresh `updated_at`.
    pub fn apply(&mut self, patch: CalendarPatch, now: i64) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(time) = patch.time {
            self.time = time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(recurring) = patch.recurring {
            self.recurring = recurring;
        }
        if let Some(cron_id) = patch.cron_id {
            self.cron_id = cron_id;
        }
        self.updated_at = now.max(self.updated_at);
    }
}

/// Input for creating a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Assignee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_id: Option<String>,
}

impl NewCalendarEvent {
    /// A plain `task` event on the given date.
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            description: None,
            time: None,
            end_time: None,
            kind: EventType::default(),
            assignee: None,
            recurring: None,
            cron_id: None,
        }
    }
}

/// Partial update for a calendar event. `null` clears optional fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventType>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub time: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<Assignee>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub recurring: Option<Option<Recurrence>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub cron_id: Option<Option<String>>,
}

impl CalendarPatch {
    /// Check that required fields are not being blanked.
    pub fn validate(&self) -> Result<(), CoreError> {
        if matches!(&self.title, Some(title) if !non_blank(title)) {
            return Err(CoreError::validation("title cannot be empty"));
        }
        if matches!(&self.date, Some(date) if !non_blank(date)) {
            return Err(CoreError::validation("date cannot be empty"));
        }
        Ok(())
    }
}

/// Date filter for listing events.
///
/// `month` (`YYYY-MM`) keeps events whose date starts with it. The range
/// applies only when both `start` and `end` are given and compares ISO date
/// strings lexicographically, inclusive on both ends. Both filters compose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl CalendarQuery {
    /// Events in one month.
    pub fn month(month: impl Into<String>) -> Self {
        Self {
            month: Some(month.into()),
            ..Self::default()
        }
    }

    /// Events between two dates, inclusive.
    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            ..Self::default()
        }
    }

    /// Check whether an event passes the filter.
    pub fn matches(&self, event: &CalendarEvent) -> bool {
        if let Some(month) = &self.month {
            if !event.date.starts_with(month.as_str()) {
                return false;
            }
        }
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            if event.date.as_str() < start.as_str() || event.date.as_str() > end.as_str() {
                return false;
            }
        }
        true
    }
}
