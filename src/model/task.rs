use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parse a priority name (case-insensitive)
    pub fn parse_priority(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::parse_priority(s)
            .ok_or_else(|| format!("invalid priority '{}' (expected low, medium or high)", s))
    }
}

/// Which side of the progress/completed pair changed last.
/// The other side is brought in line by [`Task::reconcile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// Progress was set: `completed` follows `progress >= 100`
    FromProgress,
    /// Completion was flipped: progress snaps to 100, or drops to 99 when un-completing
    FromCompletion,
}

/// A single tracked task.
///
/// Field names match the stored record layout (`desc` on disk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Opaque unique ID, fixed at creation
    pub id: String,
    pub title: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    /// Due date (no time component); `None` means no deadline
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    /// Percentage, 0..=100. Stored values outside the range are clamped on load.
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    /// Creation time, only used to order tasks within a priority tier
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    /// Build a task from a draft. `completed` is derived from the draft's progress.
    pub fn from_draft(id: String, draft: TaskDraft, created: DateTime<Utc>) -> Self {
        let mut task = Task {
            id,
            title: draft.title,
            description: draft.description,
            due: draft.due,
            priority: draft.priority,
            progress: draft.progress,
            created,
            completed: false,
        };
        task.reconcile(Reconcile::FromProgress);
        task
    }

    /// A task counts as done when it is flagged complete or fully progressed.
    pub fn is_done(&self) -> bool {
        self.completed || self.progress >= 100
    }

    /// Overwrite every mutable field from the draft and recompute `completed`.
    pub fn apply_draft(&mut self, draft: TaskDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.due = draft.due;
        self.priority = draft.priority;
        self.progress = draft.progress;
        self.reconcile(Reconcile::FromProgress);
    }

    /// Flip completion and reconcile progress.
    pub fn toggle_complete(&mut self) {
        self.completed = !self.completed;
        self.reconcile(Reconcile::FromCompletion);
    }

    /// Keep `progress` and `completed` consistent after a mutation.
    pub fn reconcile(&mut self, from: Reconcile) {
        match from {
            Reconcile::FromProgress => {
                self.progress = self.progress.min(100);
                self.completed = self.progress >= 100;
            }
            Reconcile::FromCompletion => {
                if self.completed {
                    self.progress = 100;
                } else if self.progress >= 100 {
                    self.progress = 99;
                }
            }
        }
    }
}

/// Accept any JSON number for `progress`, rounded and clamped into 0..=100,
/// so one hand-edited record cannot make the whole slot unreadable.
fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

/// Editable fields of a task, as submitted by the create and edit forms.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub due: Option<NaiveDate>,
    pub priority: Priority,
    pub progress: u8,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        TaskDraft {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Snapshot of a task's current field values (what an edit form opens with)
    pub fn from_task(task: &Task) -> Self {
        TaskDraft {
            title: task.title.clone(),
            description: task.description.clone(),
            due: task.due,
            priority: task.priority,
            progress: task.progress,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn due(mut self, due: Option<NaiveDate>) -> Self {
        self.due = due;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = progress;
        self
    }

    /// Trim text fields and clamp progress into 0..=100
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.progress = self.progress.min(100);
        self
    }
}
