//! Dependency-graph engine.
//!
//! [`DependencyGraph`] owns no graph state of its own. Every operation reads
//! the records it needs from the [`TaskStore`], validates the requested
//! change against the persisted edges, and writes the result back. The
//! dependency relation is kept acyclic and free of dangling references after
//! every committed mutation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tasklink::domain::NewTask;
//! use tasklink::graph::DependencyGraph;
//! use tasklink::store::InMemoryTaskStore;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let graph = DependencyGraph::new(Arc::new(InMemoryTaskStore::new("tl".into())));
//!
//!     let design = graph.create_task(NewTask::titled("Design"), &[]).await?;
//!     let build = graph
//!         .create_task(NewTask::titled("Build"), &[design.id.clone()])
//!         .await?;
//!
//!     // Rejected: design would depend on something that depends on it.
//!     assert!(graph.add_dependency(&design.id, &build.id).await.is_err());
//!     Ok(())
//! }
//! ```

mod closure;
mod cycle;
mod events;

pub use closure::{
    collect_dependencies, DependencyReport, DependencySummary, LeveledDependency, ReportSubject,
};
pub use cycle::would_create_cycle;
pub use events::{GraphEvent, GraphObserver};

use crate::domain::{dedup_ids, NewTask, Task, TaskId, TaskUpdate};
use crate::error::{Error, Result};
use crate::store::TaskStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Task graph operations over a shared [`TaskStore`].
pub struct DependencyGraph {
    store: Arc<dyn TaskStore>,
    observers: Vec<Arc<dyn GraphObserver>>,
}

impl DependencyGraph {
    /// Create an engine over `store` with no observers.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            observers: Vec::new(),
        }
    }

    /// Register an observer for committed mutations.
    pub fn with_observer(mut self, observer: Arc<dyn GraphObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Create a task and attach its initial dependencies.
    ///
    /// The task is first persisted with an empty dependency set. Each
    /// requested dependency is then checked in order for existence and for
    /// cycles. If any check fails the new record is deleted again and the
    /// first failure is returned; otherwise the whole set is saved at once.
    /// Repeated identifiers are collapsed.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if `fields` are invalid
    /// - `Error::DependencyNotFound` for the first requested ID that does not exist
    /// - `Error::CircularDependency` if a requested ID would close a cycle
    pub async fn create_task(&self, fields: NewTask, dependency_ids: &[TaskId]) -> Result<Task> {
        debug!(title = %fields.title, dependencies = dependency_ids.len(), "Creating task");

        let task = self.store.create(fields).await?;

        match self.attach_initial(task.clone(), dependency_ids).await {
            Ok(task) => {
                info!(id = %task.id, dependencies = task.dependencies.len(), "Created task");
                self.emit(GraphEvent::TaskCreated {
                    id: task.id.clone(),
                });
                Ok(task)
            }
            Err(e) => {
                if let Err(rollback) = self.store.delete(&task.id).await {
                    warn!(id = %task.id, error = %rollback, "Failed to remove rejected task");
                }
                Err(e)
            }
        }
    }

    async fn attach_initial(&self, mut task: Task, dependency_ids: &[TaskId]) -> Result<Task> {
        if dependency_ids.is_empty() {
            return Ok(task);
        }

        task.dependencies = self.validate_candidates(&task.id, dependency_ids).await?;
        self.store.save(task).await
    }

    /// Make `subject` depend on `dependency`.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if either task does not exist
    /// - `Error::DuplicateDependency` if the relation already holds
    /// - `Error::CircularDependency` if `dependency` already reaches `subject`
    ///   (including `subject == dependency`)
    /// - `Error::RevisionConflict` if `subject` changed concurrently
    pub async fn add_dependency(&self, subject: &TaskId, dependency: &TaskId) -> Result<Task> {
        debug!(%subject, %dependency, "Adding dependency");

        let mut task = self.require(subject).await?;
        if !self.store.exists(dependency).await? {
            return Err(Error::TaskNotFound(dependency.clone()));
        }
        if task.depends_on(dependency) {
            return Err(Error::DuplicateDependency {
                from: subject.clone(),
                to: dependency.clone(),
            });
        }
        if would_create_cycle(self.store.as_ref(), subject, dependency).await? {
            warn!(%subject, %dependency, "Rejected dependency: would create a cycle");
            return Err(Error::CircularDependency {
                from: subject.clone(),
                to: dependency.clone(),
            });
        }

        task.dependencies.push(dependency.clone());
        let task = self.store.save(task).await?;

        info!(%subject, %dependency, "Added dependency");
        self.emit(GraphEvent::DependenciesChanged {
            id: task.id.clone(),
        });
        Ok(task)
    }

    /// Remove `dependency` from `subject`'s dependency set.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if `subject` does not exist
    /// - `Error::DependencyNotPresent` if the relation does not hold
    /// - `Error::RevisionConflict` if `subject` changed concurrently
    pub async fn remove_dependency(&self, subject: &TaskId, dependency: &TaskId) -> Result<Task> {
        debug!(%subject, %dependency, "Removing dependency");

        let mut task = self.require(subject).await?;
        if !task.depends_on(dependency) {
            return Err(Error::DependencyNotPresent {
                from: subject.clone(),
                to: dependency.clone(),
            });
        }

        task.dependencies.retain(|dep| dep != dependency);
        let task = self.store.save(task).await?;

        info!(%subject, %dependency, "Removed dependency");
        self.emit(GraphEvent::DependenciesChanged {
            id: task.id.clone(),
        });
        Ok(task)
    }

    /// Replace `subject`'s dependency set with `new_ids`.
    ///
    /// Every candidate is validated against the currently persisted edges;
    /// the set is only replaced when all pass.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if `subject` does not exist
    /// - `Error::DependencyNotFound` for the first candidate that does not exist
    /// - `Error::CircularDependency` for the first candidate that would close a cycle
    pub async fn update_dependencies(&self, subject: &TaskId, new_ids: &[TaskId]) -> Result<Task> {
        debug!(%subject, dependencies = new_ids.len(), "Replacing dependencies");

        let mut task = self.require(subject).await?;
        task.dependencies = self.validate_candidates(subject, new_ids).await?;
        let task = self.store.save(task).await?;

        info!(%subject, dependencies = task.dependencies.len(), "Replaced dependencies");
        self.emit(GraphEvent::DependenciesChanged {
            id: task.id.clone(),
        });
        Ok(task)
    }

    /// Apply a field update, including an optional dependency replacement.
    ///
    /// Nothing is written unless every part of the update is valid. An empty
    /// update returns the stored task unchanged.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if `id` does not exist
    /// - `Error::Validation` if the new title is invalid
    /// - any error of [`update_dependencies`](Self::update_dependencies) when
    ///   the update carries a dependency list
    pub async fn update_task(&self, id: &TaskId, update: TaskUpdate) -> Result<Task> {
        debug!(%id, "Updating task");

        let mut task = self.require(id).await?;
        if update.is_empty() {
            return Ok(task);
        }

        if let Some(ids) = &update.dependencies {
            task.dependencies = self.validate_candidates(id, ids).await?;
        }
        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(due_date) = update.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(status) = update.status {
            task.status = status;
        }

        let task = self.store.save(task).await?;

        info!(%id, "Updated task");
        self.emit(GraphEvent::TaskUpdated {
            id: task.id.clone(),
        });
        Ok(task)
    }

    /// Delete a task, first stripping it from every dependency set that
    /// references it.
    ///
    /// Returns the IDs of the tasks whose sets were changed.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if `id` does not exist
    pub async fn delete_task(&self, id: &TaskId) -> Result<Vec<TaskId>> {
        debug!(%id, "Deleting task");

        if !self.store.exists(id).await? {
            return Err(Error::TaskNotFound(id.clone()));
        }

        let mut dependents = self.store.find_referencing(id).await?;
        for task in &mut dependents {
            task.dependencies.retain(|dep| dep != id);
        }
        let cascaded: Vec<TaskId> = dependents.iter().map(|task| task.id.clone()).collect();

        self.store.commit_cascade(dependents, id).await?;

        info!(%id, cascaded = cascaded.len(), "Deleted task");
        self.emit(GraphEvent::TaskDeleted {
            id: id.clone(),
            cascaded: cascaded.clone(),
        });
        Ok(cascaded)
    }

    /// Fetch a task.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if `id` does not exist
    pub async fn get_task(&self, id: &TaskId) -> Result<Task> {
        self.require(id).await
    }

    /// All tasks, newest first.
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut tasks = self.store.list().await?;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(tasks)
    }

    /// Every direct and indirect dependency of `id`, grouped by level.
    ///
    /// # Errors
    ///
    /// - `Error::TaskNotFound` if `id` does not exist
    pub async fn get_all_dependencies(&self, id: &TaskId) -> Result<DependencyReport> {
        collect_dependencies(self.store.as_ref(), id).await
    }

    /// Persist pending store changes.
    pub async fn flush(&self) -> Result<()> {
        self.store.flush().await
    }

    async fn require(&self, id: &TaskId) -> Result<Task> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| Error::TaskNotFound(id.clone()))
    }

    /// Check each candidate in order for existence and, independently, for
    /// cycles against the persisted graph. Returns the deduplicated set.
    async fn validate_candidates(&self, subject: &TaskId, ids: &[TaskId]) -> Result<Vec<TaskId>> {
        let candidates = dedup_ids(ids);

        for candidate in &candidates {
            if !self.store.exists(candidate).await? {
                return Err(Error::DependencyNotFound(candidate.clone()));
            }
            if would_create_cycle(self.store.as_ref(), subject, candidate).await? {
                warn!(%subject, dependency = %candidate, "Rejected dependency: would create a cycle");
                return Err(Error::CircularDependency {
                    from: subject.clone(),
                    to: candidate.clone(),
                });
            }
        }

        Ok(candidates)
    }

    fn emit(&self, event: GraphEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use crate::store::InMemoryTaskStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<GraphEvent>>);

    impl GraphObserver for Recorder {
        fn on_event(&self, event: &GraphEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    fn graph() -> (DependencyGraph, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let graph = DependencyGraph::new(Arc::new(InMemoryTaskStore::new("tl".into())))
            .with_observer(recorder.clone());
        (graph, recorder)
    }

    #[tokio::test]
    async fn create_with_missing_dependency_leaves_nothing_behind() {
        let (graph, recorder) = graph();
        let dep = graph.create_task(NewTask::titled("dep"), &[]).await.unwrap();

        let err = graph
            .create_task(
                NewTask::titled("new"),
                &[dep.id.clone(), TaskId::new("tl-missing")],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DependencyNotFound(ref id) if id.as_str() == "tl-missing"));
        assert_eq!(graph.list_tasks().await.unwrap().len(), 1);
        assert_eq!(recorder.0.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_collapses_repeated_dependencies() {
        let (graph, _) = graph();
        let dep = graph.create_task(NewTask::titled("dep"), &[]).await.unwrap();

        let task = graph
            .create_task(NewTask::titled("new"), &[dep.id.clone(), dep.id.clone()])
            .await
            .unwrap();
        assert_eq!(task.dependencies, vec![dep.id]);
    }

    #[tokio::test]
    async fn update_task_applies_fields_and_dependencies_together() {
        let (graph, recorder) = graph();
        let dep = graph.create_task(NewTask::titled("dep"), &[]).await.unwrap();
        let task = graph.create_task(NewTask::titled("task"), &[]).await.unwrap();

        let updated = graph
            .update_task(
                &task.id,
                TaskUpdate {
                    title: Some("renamed".into()),
                    status: Some(TaskStatus::InProgress),
                    dependencies: Some(vec![dep.id.clone()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.dependencies, vec![dep.id]);
        assert_eq!(
            recorder.0.lock().unwrap().last(),
            Some(&GraphEvent::TaskUpdated { id: task.id })
        );
    }

    #[tokio::test]
    async fn rejected_update_changes_nothing() {
        let (graph, _) = graph();
        let task = graph.create_task(NewTask::titled("task"), &[]).await.unwrap();

        let err = graph
            .update_task(
                &task.id,
                TaskUpdate {
                    title: Some("renamed".into()),
                    dependencies: Some(vec![task.id.clone()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CircularDependency { .. }));
        assert_eq!(graph.get_task(&task.id).await.unwrap().title, "task");
    }

    #[tokio::test]
    async fn sibling_candidates_are_checked_against_persisted_edges() {
        // b and c are independent; replacing a's set with [b, c] is valid
        // even though both are new edges.
        let (graph, _) = graph();
        let b = graph.create_task(NewTask::titled("b"), &[]).await.unwrap();
        let c = graph.create_task(NewTask::titled("c"), &[]).await.unwrap();
        let a = graph.create_task(NewTask::titled("a"), &[]).await.unwrap();

        let a = graph
            .update_dependencies(&a.id, &[b.id.clone(), c.id.clone()])
            .await
            .unwrap();
        assert_eq!(a.dependencies, vec![b.id, c.id]);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (graph, _) = graph();
        let first = graph.create_task(NewTask::titled("first"), &[]).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = graph.create_task(NewTask::titled("second"), &[]).await.unwrap();

        let ids: Vec<TaskId> = graph
            .list_tasks()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn delete_reports_cascaded_dependents() {
        let (graph, recorder) = graph();
        let target = graph.create_task(NewTask::titled("target"), &[]).await.unwrap();
        let user = graph
            .create_task(NewTask::titled("user"), &[target.id.clone()])
            .await
            .unwrap();

        let cascaded = graph.delete_task(&target.id).await.unwrap();
        assert_eq!(cascaded, vec![user.id.clone()]);
        assert_eq!(
            recorder.0.lock().unwrap().last(),
            Some(&GraphEvent::TaskDeleted {
                id: target.id,
                cascaded: vec![user.id],
            })
        );
    }
}
