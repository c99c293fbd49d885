use alloc::string::String;
use strata_common::TypeError;
use thiserror::Error;

use crate::task::{TaskId, VariantKind};

/// Errors reported by the runtime while registering or launching tasks.
///
/// Structural violations detected inside a task body are assertions, they never show up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// No task is registered under the id.
    #[error("Task {0} is not registered")]
    TaskNotFound(TaskId),

    /// The task exists but doesn't provide the variant.
    #[error("Task {task} has no {variant} variant")]
    VariantNotFound {
        /// The requested task.
        task: TaskId,
        /// The missing variant.
        variant: VariantKind,
    },

    /// The variant is already registered for the task.
    #[error("Task {task} already has a {variant} variant")]
    DuplicateVariant {
        /// The task being registered.
        task: TaskId,
        /// The variant registered twice.
        variant: VariantKind,
    },

    /// A library with the same name is already registered.
    #[error("Library {0} is already registered")]
    DuplicateLibrary(String),

    /// The local task id doesn't fit in the id block of its library.
    #[error("Local task id {local_id} exceeds the {max_tasks} tasks of library {library}")]
    TaskIdOutOfRange {
        /// The library name.
        library: String,
        /// The requested local task id.
        local_id: u32,
        /// Number of task ids reserved by the library.
        max_tasks: u32,
    },

    /// A launch needs at least one point task.
    #[error("Can't launch a task over an empty launch domain")]
    EmptyLaunchDomain,

    /// A store can't be used the way it was requested.
    #[error("Invalid input\nCaused by:\n  {reason}")]
    InvalidInput {
        /// The details of the error.
        reason: String,
    },

    /// A type or reduction lookup failed.
    #[error("A type error happened\nCaused by:\n  {0}")]
    Type(#[from] TypeError),
}
