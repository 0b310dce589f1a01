use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::model::task::Priority;
use crate::model::view::FilterMode;

#[derive(Parser)]
#[command(name = "tb", about = concat!("taskboard v", env!("CARGO_PKG_VERSION"), " - tasks and progress at a glance"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    /// Treat this date (YYYY-MM-DD) as today for due-date figures
    #[arg(long, global = true)]
    pub today: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task to the top of the board
    Add(AddArgs),
    /// List tasks with the dashboard (default)
    List(ListArgs),
    /// Show one task
    Show(ShowArgs),
    /// Show the dashboard only
    Stats,
    /// Toggle a task between complete and incomplete
    Done(DoneArgs),
    /// Edit a task's fields
    Edit(EditArgs),
    /// Permanently delete a task
    Rm(RmArgs),
    /// Permanently delete all tasks
    Clear(ClearArgs),
    /// View or prune the recovery log
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Longer description
    #[arg(long)]
    pub desc: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<NaiveDate>,
    /// low, medium or high
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    /// Progress percentage (0-100)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub progress: u8,
}

#[derive(Args)]
pub struct ListArgs {
    /// all, active or done (default from config)
    #[arg(long)]
    pub filter: Option<FilterMode>,
    /// Only tasks whose title or description contains this text
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct DoneArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long)]
    pub desc: Option<String>,
    /// New due date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "no_due")]
    pub due: Option<NaiveDate>,
    /// Remove the due date
    #[arg(long)]
    pub no_due: bool,
    /// low, medium or high
    #[arg(long)]
    pub priority: Option<Priority>,
    /// Progress percentage (0-100); completion follows from it
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub progress: Option<u8>,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID
    pub id: String,
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Show only the N most recent entries
    #[arg(long)]
    pub limit: Option<usize>,
    /// Remove entries older than 30 days
    #[arg(long)]
    pub prune: bool,
    /// With --prune, remove every entry
    #[arg(long, requires = "prune")]
    pub all: bool,
}
