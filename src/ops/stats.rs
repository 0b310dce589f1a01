use chrono::NaiveDate;
use serde::Serialize;

use crate::model::task::Task;

/// Placeholder shown where a date is absent
pub const NO_DATE: &str = "—";

/// Dashboard figures derived from the whole collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoardStats {
    /// Rounded mean progress over all tasks, 0 when there are none
    pub overall_percent: u8,
    pub total_count: usize,
    pub completed_count: usize,
    /// Earliest due date among incomplete tasks
    pub next_due: Option<NaiveDate>,
    pub overdue_count: usize,
}

impl BoardStats {
    /// `next_due` formatted for display, or [`NO_DATE`]
    pub fn next_due_display(&self) -> String {
        display_date(self.next_due)
    }
}

/// Compute all dashboard figures relative to `today`.
pub fn board_stats(tasks: &[Task], today: NaiveDate) -> BoardStats {
    BoardStats {
        overall_percent: overall_percent(tasks),
        total_count: tasks.len(),
        completed_count: tasks.iter().filter(|t| t.is_done()).count(),
        next_due: next_due(tasks),
        overdue_count: overdue_count(tasks, today),
    }
}

/// Mean progress rounded half-up.
pub fn overall_percent(tasks: &[Task]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }
    let n = tasks.len() as u64;
    let sum: u64 = tasks.iter().map(|t| u64::from(t.progress.min(100))).sum();
    ((2 * sum + n) / (2 * n)) as u8
}

pub fn next_due(tasks: &[Task]) -> Option<NaiveDate> {
    tasks
        .iter()
        .filter(|t| !t.completed)
        .filter_map(|t| t.due)
        .min()
}

/// Incomplete tasks whose due date is before `today`. Due today is not overdue.
pub fn overdue_count(tasks: &[Task], today: NaiveDate) -> usize {
    tasks
        .iter()
        .filter(|t| !t.completed && t.due.is_some_and(|due| due < today))
        .count()
}

pub fn display_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => NO_DATE.to_string(),
    }
}
