//! Error taxonomy for repository and store operations.

use thiserror::Error;

/// Errors surfaced by the repositories and the persistent store.
///
/// Lookup failures carry the offending ids so the CLI can report them
/// verbatim. Persistence failures are wrapped unchanged; nothing in this
/// crate retries or swallows them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("task {0} not found")]
    TaskNotFound(u64),

    #[error("subtask {subtask} not found on task {task}")]
    SubtaskNotFound { task: u64, subtask: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
