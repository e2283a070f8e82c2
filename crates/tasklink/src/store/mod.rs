//! Task store abstraction.
//!
//! The dependency-graph engine never owns task records; it reads and writes
//! them through the [`TaskStore`] trait. Two backends are provided:
//!
//! - **In-memory**: a `HashMap` behind a mutex, ephemeral
//! - **JSONL**: the in-memory store plus JSON Lines persistence on
//!   [`TaskStore::flush`]
//!
//! # Concurrency
//!
//! Stores must make `save` an atomic read-modify-write per record. The
//! provided backends do this with optimistic concurrency: every record
//! carries a `revision`, and a save whose revision no longer matches the
//! stored one fails with [`Error::RevisionConflict`](crate::error::Error)
//! instead of overwriting a concurrent change.
//!
//! # Example
//!
//! ```no_run
//! use tasklink::domain::NewTask;
//! use tasklink::store::{create_store, StoreBackend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let store = create_store(StoreBackend::InMemory, "tl".to_string()).await?;
//!     let task = store.create(NewTask::titled("Write docs")).await?;
//!     println!("Created task: {}", task.id);
//!     Ok(())
//! }
//! ```

use crate::domain::{NewTask, Task, TaskId};
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod in_memory;
pub mod jsonl;

pub use in_memory::InMemoryTaskStore;
pub use jsonl::{JsonlTaskStore, LoadWarning};

/// Persistence interface consumed by the dependency-graph engine.
///
/// All methods take `&self`; implementations use interior mutability so a
/// single store can be shared behind an `Arc` by concurrent callers.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Get a task by ID. Returns `None` if it doesn't exist.
    async fn get(&self, id: &TaskId) -> Result<Option<Task>>;

    /// Check whether a task exists.
    async fn exists(&self, id: &TaskId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    /// Find every task whose dependency set contains `id`.
    async fn find_referencing(&self, id: &TaskId) -> Result<Vec<Task>>;

    /// Create a task from `fields` with an empty dependency set.
    ///
    /// The store assigns the identifier and timestamps.
    async fn create(&self, fields: NewTask) -> Result<Task>;

    /// Persist the full record, including its dependency set.
    ///
    /// Returns the stored record with its revision advanced.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if the record no longer exists
    /// - `Error::RevisionConflict` if the record changed since `task` was read
    /// - `Error::DependencyNotFound` or `Error::CircularDependency` if the
    ///   graph changed since the engine validated the new edges (stores that
    ///   can check this under their own lock)
    async fn save(&self, task: Task) -> Result<Task>;

    /// Remove a task record.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if the record doesn't exist
    async fn delete(&self, id: &TaskId) -> Result<()>;

    /// All tasks, in no particular order.
    async fn list(&self) -> Result<Vec<Task>>;

    /// Save the stripped `dependents` and then delete `removed`.
    ///
    /// Stores able to group writes override this to apply everything at once.
    /// The default saves every dependent before deleting, so no dependency
    /// set observably references a missing task. It cannot see a dependent
    /// added after `dependents` was collected; stores that hold a lock across
    /// the whole cascade should reject that case with
    /// [`Error::CascadeConflict`](crate::error::Error::CascadeConflict).
    async fn commit_cascade(&self, dependents: Vec<Task>, removed: &TaskId) -> Result<()> {
        for task in dependents {
            self.save(task).await?;
        }
        self.delete(removed).await
    }

    /// Write pending changes to durable storage. No-op for memory stores.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Storage backend selection.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// JSONL file storage (persistent)
    Jsonl(PathBuf),
}

impl StoreBackend {
    /// Returns the data file path for file-based backends.
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StoreBackend::Jsonl(path) => Some(path),
            StoreBackend::InMemory => None,
        }
    }
}

/// Create a store for the given backend.
///
/// `prefix` is used for generated task IDs (e.g. "tl" for "tl-a3f8").
/// Load warnings from a JSONL file are logged and the store is returned
/// regardless.
///
/// # Errors
///
/// - `Error::Io` if the data file exists but cannot be read
pub async fn create_store(backend: StoreBackend, prefix: String) -> Result<Arc<dyn TaskStore>> {
    match backend {
        StoreBackend::InMemory => Ok(Arc::new(InMemoryTaskStore::new(prefix))),
        StoreBackend::Jsonl(path) => {
            let (store, warnings) = JsonlTaskStore::open(path, prefix).await?;
            for warning in &warnings {
                tracing::warn!(warning = %warning, "JSONL load warning");
            }
            Ok(Arc::new(store))
        }
    }
}
