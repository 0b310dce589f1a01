use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::model::task::{Priority, Task};
use crate::model::view::FilterMode;
use crate::ops::board::BoardView;
use crate::ops::filter::EMPTY_STATE;
use crate::ops::stats::{BoardStats, display_date};

/// Width of the text progress bars
const BAR_WIDTH: usize = 20;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due: Option<NaiveDate>,
    pub priority: Priority,
    pub progress: u8,
    pub completed: bool,
    /// Completed or fully progressed
    pub done: bool,
    pub created: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct StatsJson {
    pub overall_percent: u8,
    pub total: usize,
    pub completed: usize,
    pub next_due: Option<NaiveDate>,
    pub overdue: usize,
}

#[derive(Serialize)]
pub struct ListJson {
    pub filter: FilterMode,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    pub tasks: Vec<TaskJson>,
    pub stats: StatsJson,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        due: task.due,
        priority: task.priority,
        progress: task.progress,
        completed: task.completed,
        done: task.is_done(),
        created: task.created,
    }
}

pub fn stats_to_json(stats: &BoardStats) -> StatsJson {
    StatsJson {
        overall_percent: stats.overall_percent,
        total: stats.total_count,
        completed: stats.completed_count,
        next_due: stats.next_due,
        overdue: stats.overdue_count,
    }
}

pub fn view_to_json(view: &BoardView<'_>) -> ListJson {
    ListJson {
        filter: view.filter,
        search: view.search.to_string(),
        tasks: view.tasks.iter().map(|t| task_to_json(t)).collect(),
        stats: stats_to_json(&view.stats),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// `[####....]` for a 0-100 percentage
pub fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// One row in the task list
pub fn format_task_line(task: &Task) -> String {
    let mark = if task.is_done() { "[x]" } else { "[ ]" };
    format!(
        "{} {}  {}  ({}, {}%, due {})",
        mark,
        task.id,
        task.title,
        task.priority,
        task.progress,
        display_date(task.due)
    )
}

/// Multi-line detail block for `tb show`
pub fn format_task_detail(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}  {}\n", task.id, task.title));
    if !task.description.is_empty() {
        out.push_str(&format!("  {}\n", task.description));
    }
    out.push_str(&format!("  due:       {}\n", display_date(task.due)));
    out.push_str(&format!("  priority:  {}\n", task.priority));
    out.push_str(&format!(
        "  progress:  {} {}%\n",
        progress_bar(task.progress),
        task.progress
    ));
    out.push_str(&format!(
        "  status:    {}\n",
        if task.is_done() { "done" } else { "open" }
    ));
    out.push_str(&format!(
        "  created:   {}\n",
        task.created.format("%Y-%m-%d %H:%M")
    ));
    out
}

pub fn format_dashboard(stats: &BoardStats) -> String {
    format!(
        "Overall   {} {}%\nTasks     {} total, {} completed\nNext due  {}\nOverdue   {}\n",
        progress_bar(stats.overall_percent),
        stats.overall_percent,
        stats.total_count,
        stats.completed_count,
        stats.next_due_display(),
        stats.overdue_count
    )
}

/// Task rows (or the empty-state message) followed by the dashboard
pub fn format_board(view: &BoardView<'_>) -> String {
    let mut out = String::new();
    if view.tasks.is_empty() {
        out.push_str(EMPTY_STATE);
        out.push('\n');
    } else {
        for task in &view.tasks {
            out.push_str(&format_task_line(task));
            out.push('\n');
        }
    }
    out.push('\n');
    out.push_str(&format_dashboard(&view.stats));
    out
}
