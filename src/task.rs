//! Task and subtask data structures.
//!
//! This module defines the core `Task` struct together with its embedded
//! subtask checklist, plus the input and patch types the repository
//! operations consume.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fields::Priority;

/// A to-do item with scheduling, priority, and category metadata.
///
/// Subtasks are embedded: they live and die with their owning task and
/// are never stored separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    /// Category *name*. Categories are referenced by name, not id.
    pub category: String,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub completed: bool,
    pub created_at_utc: i64,
    /// Set whenever `completed` flips to true, cleared when it flips back.
    pub completed_at_utc: Option<i64>,
    /// Manual sort position. Tasks without one sort by insertion order.
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

/// A checklist item embedded within and owned by exactly one task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// Input for creating a task. Subtask entries are titles only; ids and
/// completion state are assigned by the repository.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: Priority,
    pub due_date: NaiveDate,
    pub subtasks: Vec<String>,
}

/// Field-wise patch applied by `TaskRepository::update`. `None` leaves a
/// field unchanged. Completion state is deliberately not patchable; the
/// toggle operations are the only way to change it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub clear_description: bool,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub order: Option<u32>,
}

/// Field-wise patch for a single subtask.
#[derive(Debug, Clone, Default)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}
