//! # taskflow
//!
//! A file-backed task manager with subtask checklists, category tagging,
//! completion toggling, and due-date views.
//!
//! ## Key features
//!
//! - Tasks carry a priority, a category, a due date, and an embedded
//!   subtask checklist
//! - Completing the last open subtask completes the parent task
//! - Manual ordering via `tf reorder`
//! - Derived views: active, completed, due today, overdue, by category,
//!   by priority
//! - Durable local storage: two pretty-printed JSON records under
//!   `~/.taskflow`, seeded with starter data on first run
//!
//! ## Quick start
//!
//! ```bash
//! # Add a task with a checklist
//! tf add "Plan sprint" --category Work --due friday \
//!     --subtask "Draft goals" --subtask "Book room"
//!
//! # See what's on for today
//! tf list --due today
//!
//! # Tick off a subtask
//! tf subtask toggle 1 2
//! ```
//!
//! Records live in `~/.taskflow` (override with `--data-dir`). Every
//! mutation rewrites the whole record; there are no partial writes and no
//! schema versioning, so treat the files as the single source of truth
//! and back them up like any other dotfile data.

pub mod category;
pub mod cli;
pub mod cmd;
pub mod error;
pub mod fields;
pub mod repo;
pub mod store;
pub mod task;
