use std::io::Write;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::board_io::{self, OpenBoard};
use crate::io::config_io;
use crate::io::recovery;
use crate::model::task::TaskDraft;
use crate::ops::board::{Intent, Outcome};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context {
        data_dir: resolve_data_dir(cli.data_dir.as_deref())?,
        today: cli.today.unwrap_or_else(|| Local::now().date_naive()),
        json: cli.json,
    };

    match cli.command {
        None => cmd_list(&ctx, ListArgs {
            filter: None,
            search: None,
        }),
        Some(cmd) => match cmd {
            // Read commands
            Commands::List(args) => cmd_list(&ctx, args),
            Commands::Show(args) => cmd_show(&ctx, args),
            Commands::Stats => cmd_stats(&ctx),
            Commands::Recovery(args) => cmd_recovery(&ctx, args),

            // Write commands
            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Done(args) => cmd_done(&ctx, args),
            Commands::Edit(args) => cmd_edit(&ctx, args),
            Commands::Rm(args) => cmd_rm(&ctx, args),
            Commands::Clear(args) => cmd_clear(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Per-invocation settings shared by every command
struct Context {
    data_dir: PathBuf,
    today: NaiveDate,
    json: bool,
}

impl Context {
    fn open(&self) -> Result<OpenBoard, board_io::BoardIoError> {
        board_io::open_board(&self.data_dir)
    }
}

fn resolve_data_dir(flag: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match flag {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("cannot create data directory '{}': {}", dir, e))?;
            Ok(PathBuf::from(dir))
        }
        None => Ok(config_io::default_data_dir()),
    }
}

/// Ask a yes/no question on stderr; anything but `y` is a no.
fn confirm(prompt: &str) -> std::io::Result<bool> {
    eprint!("{} [y/n] ", prompt);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let mut open = ctx.open()?;
    if let Some(mode) = args.filter {
        open.board.apply(Intent::SetFilter(mode))?;
    }
    if let Some(text) = args.search {
        open.board.apply(Intent::SetSearch(text))?;
    }

    let view = open.board.view(ctx.today);
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&view_to_json(&view))?);
    } else {
        print!("{}", format_board(&view));
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> CmdResult {
    let open = ctx.open()?;
    let task = open
        .board
        .store()
        .get(&args.id)
        .ok_or_else(|| format!("task not found: {}", args.id))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        print!("{}", format_task_detail(task));
    }
    Ok(())
}

fn cmd_stats(ctx: &Context) -> CmdResult {
    let open = ctx.open()?;
    let view = open.board.view(ctx.today);
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&stats_to_json(&view.stats))?);
    } else {
        print!("{}", format_dashboard(&view.stats));
    }
    Ok(())
}

fn cmd_recovery(ctx: &Context, args: RecoveryArgs) -> CmdResult {
    if args.prune {
        let removed = recovery::prune_recovery(&ctx.data_dir, args.all)?;
        println!("pruned {} entries", removed);
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(&ctx.data_dir, args.limit);
    if ctx.json {
        let values: Vec<_> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for entry in &entries {
            print!("{}", entry.to_markdown());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let mut open = ctx.open()?;
    let draft = TaskDraft::new(args.title)
        .description(args.desc.unwrap_or_default())
        .due(args.due)
        .priority(args.priority)
        .progress(args.progress);

    if let Outcome::Created(id) = open.board.apply(Intent::Create(draft))? {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_done(ctx: &Context, args: DoneArgs) -> CmdResult {
    let mut open = ctx.open()?;
    if open.board.apply(Intent::ToggleComplete(args.id.clone()))? == Outcome::Changed
        && let Some(task) = open.board.store().get(&args.id)
    {
        let verb = if task.completed { "completed" } else { "reopened" };
        println!("{} {} ({}%)", verb, task.id, task.progress);
    }
    Ok(())
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let mut open = ctx.open()?;
    if open.board.apply(Intent::OpenEdit(args.id.clone()))? == Outcome::Unchanged {
        return Ok(());
    }
    let Some(mut draft) = open.board.view(ctx.today).editing else {
        return Ok(());
    };

    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(desc) = args.desc {
        draft.description = desc;
    }
    if args.no_due {
        draft.due = None;
    } else if args.due.is_some() {
        draft.due = args.due;
    }
    if let Some(priority) = args.priority {
        draft.priority = priority;
    }
    if let Some(progress) = args.progress {
        draft.progress = progress;
    }

    if open.board.apply(Intent::SaveEdit(draft))? == Outcome::Changed {
        println!("{}", args.id);
    }
    Ok(())
}

fn cmd_rm(ctx: &Context, args: RmArgs) -> CmdResult {
    let mut open = ctx.open()?;
    let Some(task) = open.board.store().get(&args.id) else {
        return Ok(());
    };

    if !args.yes && !confirm(&format!("Delete \"{}\"?", task.title))? {
        println!("cancelled");
        return Ok(());
    }

    if let Outcome::Removed(removed) = open.board.apply(Intent::Delete(args.id.clone()))? {
        board_io::log_removed_tasks(&open.data_dir, "task deleted", &removed);
        println!("deleted {}", args.id);
    }
    Ok(())
}

fn cmd_clear(ctx: &Context, args: ClearArgs) -> CmdResult {
    let mut open = ctx.open()?;

    if !args.yes && !confirm("Clear ALL tasks? This cannot be undone.")? {
        println!("cancelled");
        return Ok(());
    }

    if let Outcome::Removed(removed) = open.board.apply(Intent::ClearAll)? {
        board_io::log_removed_tasks(&open.data_dir, "all tasks cleared", &removed);
        println!("cleared {} tasks", removed.len());
    }
    Ok(())
}
