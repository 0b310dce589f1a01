use chrono::Utc;
use rand::Rng;

use crate::io::slot::{SlotStore, StorageError, decode_tasks, encode_tasks};
use crate::model::task::{Priority, Task, TaskDraft};

/// Title of the task created on first run
pub const DEMO_TITLE: &str = "Welcome — try this demo task";
/// Description of the task created on first run
pub const DEMO_DESCRIPTION: &str = "Edit me, set progress, mark complete or delete.";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Rejected input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("please enter a title")]
    EmptyTitle,
}

/// Error type for store mutations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Slot contents that were dropped on load, so the caller can keep a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedSlot {
    pub reason: String,
    /// Raw contents, when they could be read at all
    pub raw: Option<String>,
}

/// The ordered task collection plus the single "currently editing" reference.
///
/// Every successful mutation is written through to the slot before returning.
/// Operations naming an unknown ID are silent no-ops.
#[derive(Debug)]
pub struct TaskStore<S> {
    slot: S,
    key: String,
    tasks: Vec<Task>,
    editing: Option<String>,
}

impl<S: SlotStore> TaskStore<S> {
    /// An empty store over `slot`. Nothing is read until [`TaskStore::load`].
    pub fn new(slot: S, key: impl Into<String>) -> Self {
        TaskStore {
            slot,
            key: key.into(),
            tasks: Vec::new(),
            editing: None,
        }
    }

    /// Restore the collection from the slot.
    ///
    /// A missing, unreadable or unparsable slot loads as empty; in the last two
    /// cases the dropped contents are returned alongside the store. An empty
    /// collection is seeded with the demo task when `seed_demo` is set, unless
    /// the slot could not be read: seeding would overwrite contents nobody has
    /// seen yet.
    pub fn load(
        slot: S,
        key: impl Into<String>,
        seed_demo: bool,
    ) -> Result<(Self, Option<DiscardedSlot>), StoreError> {
        let mut store = TaskStore::new(slot, key);

        let mut read_failed = false;
        let discarded = match store.slot.read(&store.key) {
            Ok(None) => None,
            Ok(Some(raw)) => match decode_tasks(&raw) {
                Ok(tasks) => {
                    store.tasks = tasks;
                    None
                }
                Err(e) => Some(DiscardedSlot {
                    reason: e.to_string(),
                    raw: Some(raw),
                }),
            },
            Err(e) => {
                read_failed = true;
                let raw = match &e {
                    StorageError::InvalidUtf8 { lossy, .. } => Some(lossy.clone()),
                    _ => None,
                };
                Some(DiscardedSlot {
                    reason: e.to_string(),
                    raw,
                })
            }
        };

        if store.tasks.is_empty() && seed_demo && !read_failed {
            store.create(demo_draft())?;
        }

        Ok((store, discarded))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// ID of the task whose edit form is open
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    /// Validate and prepend a new task. Returns its ID.
    pub fn create(&mut self, draft: TaskDraft) -> Result<String, StoreError> {
        let draft = draft.normalized();
        if draft.title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        let id = self.fresh_id();
        let task = Task::from_draft(id.clone(), draft, Utc::now());
        self.tasks.insert(0, task);
        self.persist()?;
        Ok(id)
    }

    /// Flip completion. Returns false when the ID is unknown.
    pub fn toggle_complete(&mut self, id: &str) -> Result<bool, StorageError> {
        let Some(task) = self.find_mut(id) else {
            return Ok(false);
        };
        task.toggle_complete();
        self.persist()?;
        Ok(true)
    }

    /// Point the editing reference at `id`, replacing any previous one, and
    /// return the task's current field values.
    pub fn open_edit(&mut self, id: &str) -> Option<TaskDraft> {
        let draft = self.get(id).map(TaskDraft::from_task)?;
        self.editing = Some(id.to_string());
        Some(draft)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Apply `draft` to the task being edited. No-op when no edit is open.
    pub fn save_edit(&mut self, draft: TaskDraft) -> Result<bool, StorageError> {
        match self.editing.clone() {
            Some(id) => self.update(&id, draft),
            None => Ok(false),
        }
    }

    /// Overwrite every mutable field of `id`. `completed` is recomputed from the
    /// new progress, and the title is not re-validated. Clears the editing
    /// reference. Returns false when the ID is unknown.
    pub fn update(&mut self, id: &str, draft: TaskDraft) -> Result<bool, StorageError> {
        let Some(task) = self.find_mut(id) else {
            return Ok(false);
        };
        task.apply_draft(draft.normalized());
        self.editing = None;
        self.persist()?;
        Ok(true)
    }

    /// Permanently remove a task. Returns the removed task, if any.
    pub fn delete(&mut self, id: &str) -> Result<Option<Task>, StorageError> {
        let Some(pos) = self.tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let removed = self.tasks.remove(pos);
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        self.persist()?;
        Ok(Some(removed))
    }

    /// Remove every task. Returns what was removed.
    pub fn clear_all(&mut self) -> Result<Vec<Task>, StorageError> {
        let removed = std::mem::take(&mut self.tasks);
        self.editing = None;
        self.persist()?;
        Ok(removed)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let content = encode_tasks(&self.tasks)?;
        self.slot.write(&self.key, &content)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

/// The first-run example task
pub fn demo_draft() -> TaskDraft {
    TaskDraft::new(DEMO_TITLE)
        .description(DEMO_DESCRIPTION)
        .priority(Priority::Medium)
        .progress(20)
}

/// Base-36 millisecond timestamp followed by four random base-36 characters.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);
    let mut rng = rand::thread_rng();
    for _ in 0..4 {
        id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
    }
    id
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
