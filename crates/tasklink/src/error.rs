//! Error types for tasklink operations.

use crate::domain::TaskId;
use std::io;
use thiserror::Error;

/// The error type for tasklink operations.
///
/// Graph-rule violations carry the identifiers involved so callers can
/// render a message naming the offending task.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization or parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Task fields failed validation (empty title, etc.).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Task not found.
    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    /// A requested dependency references a task that does not exist.
    #[error("Dependency task with ID {0} not found")]
    DependencyNotFound(TaskId),

    /// The dependency relation already holds.
    #[error("Dependency already exists: {from} -> {to}")]
    DuplicateDependency {
        /// The dependent task
        from: TaskId,
        /// The task it already depends on
        to: TaskId,
    },

    /// The dependency relation to remove does not hold.
    #[error("Dependency {to} not found in task {from}")]
    DependencyNotPresent {
        /// The task that was expected to carry the dependency
        from: TaskId,
        /// The missing dependency
        to: TaskId,
    },

    /// Adding `from -> to` would close a cycle.
    ///
    /// Self-dependencies are reported here with `from == to`.
    #[error("Circular dependency detected: {from} -> {to}")]
    CircularDependency {
        /// The task that would gain the dependency
        from: TaskId,
        /// The dependency that can already reach `from`
        to: TaskId,
    },

    /// A save was rejected because the record changed since it was read.
    #[error("Task {id} was modified concurrently (expected revision {expected}, found {actual})")]
    RevisionConflict {
        /// The contended task
        id: TaskId,
        /// Revision carried by the rejected write
        expected: u64,
        /// Revision currently stored
        actual: u64,
    },

    /// A task started depending on `removed` after the delete collected the
    /// dependents to strip.
    #[error("Task {dependent} started depending on {removed} while it was being deleted")]
    CascadeConflict {
        /// The task being deleted
        removed: TaskId,
        /// The dependent the cascade did not know about
        dependent: TaskId,
    },

    /// The backing store could not serve the request.
    #[error("Task store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Error {
    /// Returns `true` for errors that describe a rejected graph mutation
    /// rather than a failure of the surrounding infrastructure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::TaskNotFound(_)
                | Error::DependencyNotFound(_)
                | Error::DuplicateDependency { .. }
                | Error::DependencyNotPresent { .. }
                | Error::CircularDependency { .. }
                | Error::Validation(_)
        )
    }

    /// Returns `true` if retrying the same operation may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Error::RevisionConflict { .. }
                | Error::CascadeConflict { .. }
                | Error::StoreUnavailable(_)
        )
    }
}

/// Errors raised while locating or reading repository configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.tasklink/` directory was found walking up from the working directory.
    #[error("Not a tasklink repository (or any parent). Run 'tasklink init' first.")]
    NotInitialized,

    /// `tasklink init` was run where a repository already exists.
    #[error("tasklink is already initialized in this directory. Found existing '{0}'")]
    AlreadyInitialized(String),

    /// The ID prefix does not meet format requirements.
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// The storage backend named in config.yaml is unknown.
    #[error("Unknown storage backend '{0}'. Valid backends: jsonl, memory")]
    UnknownBackend(String),

    /// The configuration file could not be parsed or written.
    #[error("Configuration error: {0}")]
    Yaml(String),
}

/// A specialized Result type for tasklink operations.
pub type Result<T> = std::result::Result<T, Error>;
