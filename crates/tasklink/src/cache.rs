//! Read cache for tasks and dependency reports.
//!
//! [`TaskCache`] keeps recently read tasks and reports for a fixed
//! time-to-live. It registers as a [`GraphObserver`] so committed mutations
//! evict whatever they may have made stale:
//!
//! - the changed task, and for deletions every cascaded dependent
//! - every cached dependency report, since a report embeds titles and
//!   statuses of tasks arbitrarily far away in the graph

use crate::domain::{Task, TaskId};
use crate::error::Result;
use crate::graph::{DependencyGraph, DependencyReport, GraphEvent, GraphObserver};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default time-to-live for cache entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug)]
struct Entry<T> {
    value: T,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Entries {
    tasks: HashMap<TaskId, Entry<Task>>,
    reports: HashMap<TaskId, Entry<DependencyReport>>,
}

/// TTL cache of task reads, invalidated by graph events.
#[derive(Debug)]
pub struct TaskCache {
    ttl: Duration,
    entries: Mutex<Entries>,
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl TaskCache {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(Entries::default()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        // Entries hold plain data, so a poisoned lock is still consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached task, if present and fresh.
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        let mut entries = self.entries();
        fresh(&mut entries.tasks, id)
    }

    /// Cache a task.
    pub fn insert_task(&self, task: Task) {
        let expires_at = Instant::now() + self.ttl;
        self.entries().tasks.insert(
            task.id.clone(),
            Entry {
                value: task,
                expires_at,
            },
        );
    }

    /// Cached dependency report, if present and fresh.
    pub fn report(&self, id: &TaskId) -> Option<DependencyReport> {
        let mut entries = self.entries();
        fresh(&mut entries.reports, id)
    }

    /// Cache a dependency report.
    pub fn insert_report(&self, report: DependencyReport) {
        let expires_at = Instant::now() + self.ttl;
        self.entries().reports.insert(
            report.task.id.clone(),
            Entry {
                value: report,
                expires_at,
            },
        );
    }

    /// Read a task through the cache.
    pub async fn get_task(&self, graph: &DependencyGraph, id: &TaskId) -> Result<Task> {
        if let Some(task) = self.task(id) {
            debug!(%id, "Cache hit for task");
            return Ok(task);
        }
        debug!(%id, "Cache miss for task");
        let task = graph.get_task(id).await?;
        self.insert_task(task.clone());
        Ok(task)
    }

    /// Read a dependency report through the cache.
    pub async fn get_all_dependencies(
        &self,
        graph: &DependencyGraph,
        id: &TaskId,
    ) -> Result<DependencyReport> {
        if let Some(report) = self.report(id) {
            debug!(%id, "Cache hit for dependency report");
            return Ok(report);
        }
        debug!(%id, "Cache miss for dependency report");
        let report = graph.get_all_dependencies(id).await?;
        self.insert_report(report.clone());
        Ok(report)
    }

    /// Number of cached tasks and reports, fresh or not.
    pub fn len(&self) -> usize {
        let entries = self.entries();
        entries.tasks.len() + entries.reports.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.entries();
        entries.tasks.clear();
        entries.reports.clear();
    }
}

impl GraphObserver for TaskCache {
    fn on_event(&self, event: &GraphEvent) {
        let mut entries = self.entries();
        for id in event.affected() {
            entries.tasks.remove(id);
        }
        entries.reports.clear();
        debug!(?event, "Invalidated cache");
    }
}

fn fresh<T: Clone>(map: &mut HashMap<TaskId, Entry<T>>, id: &TaskId) -> Option<T> {
    match map.get(id) {
        Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
        Some(_) => {
            map.remove(id);
            None
        }
        None => None,
    }
}
