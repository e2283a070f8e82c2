//! Transitive dependency reports.
//!
//! A report lists every task reachable from a starting task by following
//! dependency edges, each annotated with the level at which it was first
//! discovered. Levels follow depth-first discovery order rather than
//! shortest path: in a diamond `A -> B -> D`, `A -> C -> D`, `D` is recorded
//! once, at the level it was reached through `B`.

use crate::domain::{Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use crate::store::TaskStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The task a report was computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubject {
    /// Task ID
    pub id: TaskId,
    /// Task title
    pub title: String,
}

/// A dependency as listed in the per-level grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySummary {
    /// Task ID
    pub id: TaskId,
    /// Task title
    pub title: String,
    /// Task status
    pub status: TaskStatus,
}

/// A dependency with the level at which it was first discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeveledDependency {
    /// Task ID
    pub id: TaskId,
    /// Task title
    pub title: String,
    /// Task status
    pub status: TaskStatus,
    /// Discovery depth (direct dependencies are level 1)
    pub level: u32,
}

impl LeveledDependency {
    fn summary(&self) -> DependencySummary {
        DependencySummary {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
        }
    }
}

/// Full set of direct and indirect dependencies of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    /// The queried task
    pub task: ReportSubject,

    /// Level-1 dependencies
    pub direct_dependencies: Vec<DependencySummary>,

    /// Every reachable dependency, ascending by level and in discovery order
    /// within a level
    pub all_dependencies: Vec<LeveledDependency>,

    /// `all_dependencies` grouped by level
    pub dependencies_by_level: BTreeMap<u32, Vec<DependencySummary>>,
}

impl DependencyReport {
    /// Number of distinct dependencies in the report.
    pub fn len(&self) -> usize {
        self.all_dependencies.len()
    }

    /// Returns `true` if the task has no dependencies.
    pub fn is_empty(&self) -> bool {
        self.all_dependencies.is_empty()
    }

    /// Deepest level in the report, 0 when empty.
    pub fn depth(&self) -> u32 {
        self.dependencies_by_level
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
    }

    fn from_discovered(root: &Task, mut discovered: Vec<LeveledDependency>) -> Self {
        // Stable: discovery order is kept within a level.
        discovered.sort_by_key(|dep| dep.level);

        let mut dependencies_by_level: BTreeMap<u32, Vec<DependencySummary>> = BTreeMap::new();
        for dep in &discovered {
            dependencies_by_level
                .entry(dep.level)
                .or_default()
                .push(dep.summary());
        }

        Self {
            task: ReportSubject {
                id: root.id.clone(),
                title: root.title.clone(),
            },
            direct_dependencies: dependencies_by_level.get(&1).cloned().unwrap_or_default(),
            all_dependencies: discovered,
            dependencies_by_level,
        }
    }
}

/// One partially expanded task on the walk stack.
struct Frame {
    deps: Vec<TaskId>,
    cursor: usize,
    level: u32,
}

/// Compute the dependency report for `id`.
///
/// Walks the graph depth-first with an explicit frame stack, visiting each
/// task's dependencies in listed order exactly as a recursive walk would.
/// A task already in the result is neither re-added nor re-expanded.
/// Dependencies that no longer resolve are skipped.
///
/// # Errors
///
/// - `Error::TaskNotFound` if `id` does not exist
pub async fn collect_dependencies(store: &dyn TaskStore, id: &TaskId) -> Result<DependencyReport> {
    let root = store
        .get(id)
        .await?
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

    let mut discovered: Vec<LeveledDependency> = Vec::new();
    // Level of first discovery per task; the root sits at level 0.
    let mut levels: HashMap<TaskId, u32> = HashMap::new();
    levels.insert(root.id.clone(), 0);

    let mut stack = vec![Frame {
        deps: root.dependencies.clone(),
        cursor: 0,
        level: 1,
    }];

    while let Some(frame) = stack.last_mut() {
        let Some(dep_id) = frame.deps.get(frame.cursor).cloned() else {
            stack.pop();
            continue;
        };
        frame.cursor += 1;
        let level = frame.level;

        if levels.contains_key(&dep_id) {
            continue;
        }
        let Some(dep) = store.get(&dep_id).await? else {
            continue;
        };

        levels.insert(dep_id, level);
        discovered.push(LeveledDependency {
            id: dep.id,
            title: dep.title,
            status: dep.status,
            level,
        });
        stack.push(Frame {
            deps: dep.dependencies,
            cursor: 0,
            level: level + 1,
        });
    }

    Ok(DependencyReport::from_discovered(&root, discovered))
}
