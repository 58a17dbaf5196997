use std::sync::Arc;

use thiserror::Error;

use crate::scheduler::TaskId;

/// A failure raised inside a user-supplied task callable.
///
/// Wrapped in `Arc` so the failure of a task can be cached alongside its
/// slot and handed out again to every later request without re-running the
/// callable.
#[derive(Debug, Error, Clone)]
#[error(transparent)]
pub struct ComputeError(#[from] pub(crate) Arc<anyhow::Error>);

impl ComputeError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(Arc::new(err.into()))
    }
}

impl From<anyhow::Error> for ComputeError {
    fn from(e: anyhow::Error) -> Self {
        ComputeError(Arc::new(e))
    }
}

#[derive(Debug, Error, Clone)]
pub enum MatsuError {
    /// A task id at or past the current task count was used.
    #[error("task {0} does not exist")]
    NoSuchTask(TaskId),

    /// A result was requested as a type the task did not produce.
    #[error("task {task} produced `{actual}`, but `{requested}` was requested")]
    TypeMismatch {
        task: TaskId,
        requested: &'static str,
        actual: &'static str,
    },

    /// Forcing a task re-entered a task that is already being forced.
    ///
    /// Unreachable through handles created by this scheduler; it guards
    /// against handles smuggled in from a different scheduler instance.
    #[error("task {0} is part of a dependency cycle")]
    DependencyCycle(TaskId),

    /// A task callable failed. The failure is cached and re-surfaced on
    /// every later request for this task or its dependents.
    #[error("task {0}:\n{1}")]
    Task(TaskId, #[source] ComputeError),
}
