use std::path::{Path, PathBuf};

use crate::io::config_io::{self, ConfigError};
use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::slot::DirSlotStore;
use crate::model::config::AppConfig;
use crate::model::task::Task;
use crate::ops::board::Board;
use crate::ops::store::{DiscardedSlot, StoreError, TaskStore};

/// Error type for opening a board from disk
#[derive(Debug, thiserror::Error)]
pub enum BoardIoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A board backed by a data directory, with the config it was opened with
#[derive(Debug)]
pub struct OpenBoard {
    pub data_dir: PathBuf,
    pub config: AppConfig,
    pub board: Board<DirSlotStore>,
}

/// Load config and tasks from `data_dir`.
///
/// Slot contents that cannot be read or parsed are copied to the recovery log
/// and the board starts empty.
pub fn open_board(data_dir: &Path) -> Result<OpenBoard, BoardIoError> {
    let config = config_io::read_config(data_dir)?;
    let slot = DirSlotStore::new(data_dir);
    let (store, discarded) =
        TaskStore::load(slot, config.storage.key.clone(), config.board.seed_demo)?;

    if let Some(discarded) = discarded {
        log_discarded_slot(data_dir, &config.storage.key, &discarded);
    }

    let board = Board::new(store, config.ui.default_filter);
    Ok(OpenBoard {
        data_dir: data_dir.to_path_buf(),
        config,
        board,
    })
}

fn log_discarded_slot(data_dir: &Path, key: &str, discarded: &DiscardedSlot) {
    eprintln!(
        "warning: could not load saved tasks ({}); starting empty. See `tb recovery`.",
        discarded.reason
    );
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Parser, "unreadable task slot")
            .field("Slot", key)
            .field("Error", discarded.reason.clone())
            .body(discarded.raw.clone().unwrap_or_default()),
    );
}

/// Keep a copy of removed tasks in the recovery log, one JSON record per line.
pub fn log_removed_tasks(data_dir: &Path, description: &str, tasks: &[Task]) {
    if tasks.is_empty() {
        return;
    }
    let body = tasks
        .iter()
        .filter_map(|t| serde_json::to_string(t).ok())
        .collect::<Vec<_>>()
        .join("\n");
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryCategory::Delete, description)
            .field("Count", tasks.len().to_string())
            .body(body),
    );
}
