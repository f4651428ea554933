//! Tasks assigned to employees.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A task to be assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Short title, at most 100 characters.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Day the task is due.
    pub deadline: NaiveDate,
}

/// Edits to an existing task. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New due date.
    pub deadline: Option<NaiveDate>,
    /// Mark done, or reopen with `Some(false)`.
    pub complete: Option<bool>,
}

impl TaskChanges {
    /// True when no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.complete.is_none()
    }

    /// Applies the edits to `task` in place.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(complete) = self.complete {
            task.complete = complete;
        }
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Internal key.
    pub id: u64,
    /// Internal key of the assignee.
    pub assigned_to: u64,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Day the task was assigned.
    pub assigned_date: NaiveDate,
    /// Day the task is due.
    pub deadline: NaiveDate,
    /// Whether the assignee marked it done.
    pub complete: bool,
}

impl Task {
    /// An incomplete task counts against the assignee's active-task cap.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.complete
    }

    /// True once `today` is past the deadline plus `grace_days`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate, grace_days: u32) -> bool {
        if !self.is_active() {
            return false;
        }
        let cutoff = self
            .deadline
            .checked_add_days(chrono::Days::new(u64::from(grace_days)))
            .unwrap_or(NaiveDate::MAX);
        today > cutoff
    }
}
