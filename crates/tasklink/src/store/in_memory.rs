//! In-memory task store.
//!
//! Fast, **ephemeral** storage where all records live in a `HashMap` behind
//! an `Arc<Mutex<_>>` and are lost when the process exits. The JSONL backend
//! wraps this store to add persistence.
//!
//! # Thread Safety
//!
//! Every operation holds the mutex for its whole read-check-write sequence,
//! which gives `save` and `commit_cascade` the per-record (and, for the
//! cascade, multi-record) atomicity the graph engine relies on.
//!
//! The engine validates edges before writing, but a delete or another edge
//! can be committed between its checks and its save. Both writes therefore
//! re-check the graph rules against the records held under the lock:
//!
//! - `save` rejects dependencies on missing tasks and new edges that close a
//!   cycle
//! - `commit_cascade` rejects the delete if a task outside `dependents` still
//!   references the removed task

use crate::domain::{NewTask, Task, TaskId};
use crate::error::{Error, Result};
use crate::id_generation::IdGenerator;
use crate::store::TaskStore;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Records and ID generator guarded by the store's mutex.
#[derive(Debug)]
struct Inner {
    tasks: HashMap<TaskId, Task>,
    id_generator: IdGenerator,
}

impl Inner {
    fn check_revision(&self, task: &Task) -> Result<()> {
        let stored = self
            .tasks
            .get(&task.id)
            .ok_or_else(|| Error::TaskNotFound(task.id.clone()))?;
        if stored.revision != task.revision {
            return Err(Error::RevisionConflict {
                id: task.id.clone(),
                expected: task.revision,
                actual: stored.revision,
            });
        }
        Ok(())
    }

    /// Check the edges `task` would commit against the stored graph.
    ///
    /// Every dependency must exist. Edges not already stored must not make
    /// `task` reachable from itself.
    fn check_dependencies(&self, task: &Task) -> Result<()> {
        let stored = self.tasks.get(&task.id);

        for dep in &task.dependencies {
            if !self.tasks.contains_key(dep) {
                return Err(Error::DependencyNotFound(dep.clone()));
            }
            let is_new = stored.is_none_or(|stored| !stored.depends_on(dep));
            if is_new && self.reaches(dep, &task.id) {
                return Err(Error::CircularDependency {
                    from: task.id.clone(),
                    to: dep.clone(),
                });
            }
        }
        Ok(())
    }

    /// Returns `true` if `target` is reachable from `start` over stored edges.
    fn reaches(&self, start: &TaskId, target: &TaskId) -> bool {
        let mut visited: HashSet<&TaskId> = HashSet::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(task) = self.tasks.get(current) {
                stack.extend(task.dependencies.iter().filter(|d| !visited.contains(d)));
            }
        }
        false
    }

    fn write(&mut self, mut task: Task) -> Task {
        task.revision += 1;
        task.updated_at = Utc::now();
        self.tasks.insert(task.id.clone(), task.clone());
        task
    }
}

/// Thread-safe in-memory [`TaskStore`].
///
/// Cloning is cheap and yields a handle to the same records.
#[derive(Debug, Clone)]
pub struct InMemoryTaskStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTaskStore {
    /// Create an empty store generating IDs with `prefix`.
    pub fn new(prefix: String) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                tasks: HashMap::new(),
                id_generator: IdGenerator::new(prefix),
            })),
        }
    }

    /// Create a store holding `tasks` as-is.
    ///
    /// Records are trusted: no graph validation happens here. Callers loading
    /// untrusted data go through [`crate::store::JsonlTaskStore::open`].
    pub fn with_tasks(prefix: String, tasks: Vec<Task>) -> Self {
        let mut id_generator = IdGenerator::new(prefix);
        let tasks = tasks
            .into_iter()
            .map(|task| {
                id_generator.register_id(task.id.as_str());
                (task.id.clone(), task)
            })
            .collect();

        Self {
            inner: Arc::new(Mutex::new(Inner {
                tasks,
                id_generator,
            })),
        }
    }

    /// Number of stored tasks.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.tasks.len()
    }

    /// Returns `true` if the store holds no tasks.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.tasks.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        let inner = self.inner.lock().await;
        Ok(inner.tasks.get(id).cloned())
    }

    async fn exists(&self, id: &TaskId) -> Result<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.tasks.contains_key(id))
    }

    async fn find_referencing(&self, id: &TaskId) -> Result<Vec<Task>> {
        let inner = self.inner.lock().await;
        let mut dependents: Vec<Task> = inner
            .tasks
            .values()
            .filter(|task| task.depends_on(id))
            .cloned()
            .collect();
        dependents.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(dependents)
    }

    async fn create(&self, fields: NewTask) -> Result<Task> {
        fields.validate().map_err(Error::Validation)?;

        let mut inner = self.inner.lock().await;
        let store_size = inner.tasks.len();
        let id = inner
            .id_generator
            .generate(&fields.title, &fields.description, store_size)
            .map_err(|e| Error::StoreUnavailable(format!("ID generation failed: {}", e)))?;

        let now = Utc::now();
        let task = Task {
            id: TaskId::new(id),
            title: fields.title,
            description: fields.description,
            due_date: fields.due_date,
            priority: fields.priority,
            status: Default::default(),
            dependencies: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 1,
        };
        inner.tasks.insert(task.id.clone(), task.clone());

        Ok(task)
    }

    async fn save(&self, task: Task) -> Result<Task> {
        task.validate().map_err(Error::Validation)?;

        let mut inner = self.inner.lock().await;
        inner.check_revision(&task)?;
        inner.check_dependencies(&task)?;
        Ok(inner.write(task))
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .tasks
            .remove(id)
            .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
        inner.id_generator.release_id(id.as_str());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Task>> {
        let inner = self.inner.lock().await;
        Ok(inner.tasks.values().cloned().collect())
    }

    async fn commit_cascade(&self, dependents: Vec<Task>, removed: &TaskId) -> Result<()> {
        let mut inner = self.inner.lock().await;

        // Check everything before touching anything.
        if !inner.tasks.contains_key(removed) {
            return Err(Error::TaskNotFound(removed.clone()));
        }
        for task in &dependents {
            inner.check_revision(task)?;
        }
        let listed: HashSet<&TaskId> = dependents.iter().map(|task| &task.id).collect();
        if let Some(unlisted) = inner
            .tasks
            .values()
            .find(|task| task.depends_on(removed) && !listed.contains(&task.id))
        {
            return Err(Error::CascadeConflict {
                removed: removed.clone(),
                dependent: unlisted.id.clone(),
            });
        }

        for task in dependents {
            inner.write(task);
        }
        inner.tasks.remove(removed);
        inner.id_generator.release_id(removed.as_str());

        Ok(())
    }
}
