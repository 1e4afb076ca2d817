//! Task repository: CRUD, subtask checklists, and queries.
//!
//! The repository owns the task collection exclusively. Every operation
//! hands back plain copies, never references into internal state, and
//! every mutation persists the full ledger before returning. Ids come
//! from monotonic counters persisted alongside the tasks, so an id is
//! never reused even after the highest-numbered task is deleted.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::Priority;
use crate::store::{Store, TASKS, TASK_SEED};
use crate::task::{NewTask, Subtask, SubtaskPatch, Task, TaskPatch};

/// Persisted form of the task collection: the tasks plus the counters
/// their ids are allocated from. Subtask ids share one counter across all
/// tasks, so they are globally unique by construction.
#[derive(Debug, Serialize, Deserialize)]
struct TaskLedger {
    next_task_id: u64,
    next_subtask_id: u64,
    tasks: Vec<Task>,
}

/// Owns the task collection and the store it persists to.
#[derive(Debug)]
pub struct TaskRepository {
    store: Store,
    ledger: TaskLedger,
}

impl TaskRepository {
    /// Load the repository from `store`, serving seed data on first use.
    pub fn open(store: Store) -> Result<Self> {
        let ledger = store.load(TASKS, TASK_SEED)?;
        Ok(TaskRepository { store, ledger })
    }

    fn persist(&self) -> Result<()> {
        self.store.save(TASKS, &self.ledger)
    }

    fn next_task_id(&mut self) -> u64 {
        let id = self.ledger.next_task_id;
        self.ledger.next_task_id += 1;
        id
    }

    fn next_subtask_id(&mut self) -> u64 {
        let id = self.ledger.next_subtask_id;
        self.ledger.next_subtask_id += 1;
        id
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.ledger
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))
    }

    fn task_mut(&mut self, id: u64) -> Result<&mut Task> {
        let idx = self.position(id)?;
        Ok(&mut self.ledger.tasks[idx])
    }

    /// All tasks, in insertion order.
    pub fn all(&self) -> Vec<Task> {
        self.ledger.tasks.clone()
    }

    /// Look up a task by id.
    pub fn get(&self, id: u64) -> Option<Task> {
        self.ledger.tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Create a task. Any subtask titles in `new` become incomplete
    /// subtasks with freshly allocated ids.
    pub fn create(&mut self, new: NewTask) -> Result<Task> {
        let id = self.next_task_id();
        let mut subtasks = Vec::with_capacity(new.subtasks.len());
        for title in new.subtasks {
            subtasks.push(Subtask { id: self.next_subtask_id(), title, completed: false });
        }
        let task = Task {
            id,
            title: new.title,
            description: new.description,
            category: new.category,
            priority: new.priority,
            due_date: new.due_date,
            completed: false,
            created_at_utc: Utc::now().timestamp(),
            completed_at_utc: None,
            order: None,
            subtasks,
        };
        self.ledger.tasks.push(task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Shallow-merge `patch` onto the task with `id`.
    pub fn update(&mut self, id: u64, patch: TaskPatch) -> Result<Task> {
        let task = self.task_mut(id)?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if patch.clear_description {
            task.description = None;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(category) = patch.category {
            task.category = category;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(order) = patch.order {
            task.order = Some(order);
        }
        let updated = task.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Delete a task together with its embedded subtasks.
    pub fn delete(&mut self, id: u64) -> Result<()> {
        let idx = self.position(id)?;
        self.ledger.tasks.remove(idx);
        self.persist()
    }

    /// Flip a task's completion state, stamping or clearing the
    /// completion time. Subtasks are left untouched.
    // TODO: decide whether completing a task should also tick its
    // subtasks; today only the subtask -> parent direction cascades.
    pub fn toggle_complete(&mut self, id: u64) -> Result<Task> {
        let task = self.task_mut(id)?;
        task.completed = !task.completed;
        task.completed_at_utc = if task.completed { Some(Utc::now().timestamp()) } else { None };
        let updated = task.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Overwrite `order` with each task's position in `ordered_ids`.
    /// Unknown ids are skipped (their slot still counts); tasks not
    /// listed keep their prior order. The caller's ordering is trusted
    /// as-is.
    pub fn reorder(&mut self, ordered_ids: &[u64]) -> Result<()> {
        for (pos, id) in ordered_ids.iter().enumerate() {
            if let Some(task) = self.ledger.tasks.iter_mut().find(|t| t.id == *id) {
                task.order = Some(pos as u32);
            }
        }
        self.persist()
    }

    /// Append a new incomplete subtask to a task's checklist. Returns a
    /// copy of the parent task.
    pub fn create_subtask(&mut self, task_id: u64, title: impl Into<String>) -> Result<Task> {
        // Check the parent first so a missing task does not burn an id.
        let idx = self.position(task_id)?;
        let id = self.next_subtask_id();
        let task = &mut self.ledger.tasks[idx];
        task.subtasks.push(Subtask { id, title: title.into(), completed: false });
        let updated = task.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Shallow-merge `patch` onto one subtask. Unlike toggling, a direct
    /// edit never triggers the parent auto-complete.
    pub fn update_subtask(
        &mut self,
        task_id: u64,
        subtask_id: u64,
        patch: SubtaskPatch,
    ) -> Result<Task> {
        let task = self.task_mut(task_id)?;
        let sub = task
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or(Error::SubtaskNotFound { task: task_id, subtask: subtask_id })?;
        if let Some(title) = patch.title {
            sub.title = title;
        }
        if let Some(completed) = patch.completed {
            sub.completed = completed;
        }
        let updated = task.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Remove a subtask from a task's checklist.
    pub fn delete_subtask(&mut self, task_id: u64, subtask_id: u64) -> Result<Task> {
        let task = self.task_mut(task_id)?;
        let idx = task
            .subtasks
            .iter()
            .position(|s| s.id == subtask_id)
            .ok_or(Error::SubtaskNotFound { task: task_id, subtask: subtask_id })?;
        task.subtasks.remove(idx);
        let updated = task.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Flip a subtask's completion state. When the flip leaves every
    /// subtask complete, the parent task is forced complete as well.
    pub fn toggle_subtask(&mut self, task_id: u64, subtask_id: u64) -> Result<Task> {
        let task = self.task_mut(task_id)?;
        let sub = task
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or(Error::SubtaskNotFound { task: task_id, subtask: subtask_id })?;
        sub.completed = !sub.completed;
        if !task.subtasks.is_empty() && task.subtasks.iter().all(|s| s.completed) {
            task.completed = true;
            task.completed_at_utc = Some(Utc::now().timestamp());
        }
        let updated = task.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Completed tasks.
    pub fn completed(&self) -> Vec<Task> {
        self.ledger.tasks.iter().filter(|t| t.completed).cloned().collect()
    }

    /// Tasks still open.
    pub fn active(&self) -> Vec<Task> {
        self.ledger.tasks.iter().filter(|t| !t.completed).cloned().collect()
    }

    /// Tasks tagged with the given category name.
    pub fn in_category(&self, category: &str) -> Vec<Task> {
        self.ledger.tasks.iter().filter(|t| t.category == category).cloned().collect()
    }

    /// Tasks at the given priority.
    pub fn with_priority(&self, priority: Priority) -> Vec<Task> {
        self.ledger.tasks.iter().filter(|t| t.priority == priority).cloned().collect()
    }

    /// Open tasks due on the local calendar date. Date-only comparison;
    /// time of day never enters into it.
    pub fn due_today(&self) -> Vec<Task> {
        let today = Local::now().date_naive();
        self.ledger
            .tasks
            .iter()
            .filter(|t| !t.completed && t.due_date == today)
            .cloned()
            .collect()
    }

    /// Open tasks whose due date has passed.
    pub fn overdue(&self) -> Vec<Task> {
        let today = Local::now().date_naive();
        self.ledger
            .tasks
            .iter()
            .filter(|t| !t.completed && t.due_date < today)
            .cloned()
            .collect()
    }
}
