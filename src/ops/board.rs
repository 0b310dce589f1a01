use chrono::NaiveDate;

use crate::io::slot::SlotStore;
use crate::model::task::{Task, TaskDraft};
use crate::model::view::FilterMode;
use crate::ops::filter::visible_tasks;
use crate::ops::stats::{BoardStats, board_stats};
use crate::ops::store::{StoreError, TaskStore};

/// Something the presentation surface asks the board to do.
///
/// `Delete` and `ClearAll` are assumed to be confirmed by the user already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create(TaskDraft),
    ToggleComplete(String),
    OpenEdit(String),
    SaveEdit(TaskDraft),
    CancelEdit,
    Delete(String),
    ClearAll,
    SetFilter(FilterMode),
    SetSearch(String),
}

/// What applying an intent did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A task was created with this ID
    Created(String),
    /// Tasks were removed (delete or clear)
    Removed(Vec<Task>),
    /// Something else changed: a task, the edit session or the view settings
    Changed,
    /// The intent named an unknown task, or there was nothing to do
    Unchanged,
}

/// Everything a surface needs to render one frame.
#[derive(Debug)]
pub struct BoardView<'a> {
    pub tasks: Vec<&'a Task>,
    pub stats: BoardStats,
    /// Field values of the open edit form
    pub editing: Option<TaskDraft>,
    pub filter: FilterMode,
    pub search: &'a str,
}

/// Application root: the task store plus the current filter and search.
#[derive(Debug)]
pub struct Board<S> {
    store: TaskStore<S>,
    filter: FilterMode,
    search: String,
}

impl<S: SlotStore> Board<S> {
    pub fn new(store: TaskStore<S>, filter: FilterMode) -> Self {
        Board {
            store,
            filter,
            search: String::new(),
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Run one intent to completion. Mutations are persisted before returning.
    pub fn apply(&mut self, intent: Intent) -> Result<Outcome, StoreError> {
        let outcome = match intent {
            Intent::Create(draft) => Outcome::Created(self.store.create(draft)?),
            Intent::ToggleComplete(id) => changed(self.store.toggle_complete(&id)?),
            Intent::OpenEdit(id) => changed(self.store.open_edit(&id).is_some()),
            Intent::SaveEdit(draft) => changed(self.store.save_edit(draft)?),
            Intent::CancelEdit => {
                self.store.cancel_edit();
                Outcome::Changed
            }
            Intent::Delete(id) => match self.store.delete(&id)? {
                Some(task) => Outcome::Removed(vec![task]),
                None => Outcome::Unchanged,
            },
            Intent::ClearAll => Outcome::Removed(self.store.clear_all()?),
            Intent::SetFilter(mode) => {
                self.filter = mode;
                Outcome::Changed
            }
            Intent::SetSearch(text) => {
                self.search = text;
                Outcome::Changed
            }
        };
        Ok(outcome)
    }

    /// Recompute the visible tasks and statistics from scratch.
    pub fn view(&self, today: NaiveDate) -> BoardView<'_> {
        let tasks = self.store.tasks();
        BoardView {
            tasks: visible_tasks(tasks, self.filter, &self.search),
            stats: board_stats(tasks, today),
            editing: self
                .store
                .editing_id()
                .and_then(|id| self.store.get(id))
                .map(TaskDraft::from_task),
            filter: self.filter,
            search: &self.search,
        }
    }
}

fn changed(did_change: bool) -> Outcome {
    if did_change {
        Outcome::Changed
    } else {
        Outcome::Unchanged
    }
}
