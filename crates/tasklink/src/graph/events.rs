//! Mutation events emitted by the dependency graph.
//!
//! Observers are notified after the store has accepted a write, so an event
//! always describes committed state. Caches of task reads use these events
//! for invalidation.

use crate::domain::TaskId;

/// A committed change to the task graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// A task was created (with its initial dependency set, if any).
    TaskCreated {
        /// The new task
        id: TaskId,
    },

    /// Non-dependency fields of a task changed, possibly along with its
    /// dependency set.
    TaskUpdated {
        /// The updated task
        id: TaskId,
    },

    /// Only the dependency set of a task changed.
    DependenciesChanged {
        /// The task whose set changed
        id: TaskId,
    },

    /// A task was deleted and stripped from its dependents' sets.
    TaskDeleted {
        /// The deleted task
        id: TaskId,
        /// Tasks whose dependency sets lost `id`
        cascaded: Vec<TaskId>,
    },
}

impl GraphEvent {
    /// Every task whose stored record this event changed.
    pub fn affected(&self) -> Vec<&TaskId> {
        match self {
            GraphEvent::TaskCreated { id }
            | GraphEvent::TaskUpdated { id }
            | GraphEvent::DependenciesChanged { id } => vec![id],
            GraphEvent::TaskDeleted { id, cascaded } => {
                std::iter::once(id).chain(cascaded.iter()).collect()
            }
        }
    }
}

/// Receives [`GraphEvent`]s from a [`DependencyGraph`](super::DependencyGraph).
///
/// Called synchronously on the mutating task; implementations should be
/// quick and must not call back into the graph.
pub trait GraphObserver: Send + Sync {
    /// Handle a committed change.
    fn on_event(&self, event: &GraphEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deletion_affects_cascaded_tasks() {
        let event = GraphEvent::TaskDeleted {
            id: "tl-a".into(),
            cascaded: vec!["tl-b".into(), "tl-c".into()],
        };
        let affected: Vec<&str> = event.affected().into_iter().map(TaskId::as_str).collect();
        assert_eq!(affected, vec!["tl-a", "tl-b", "tl-c"]);
    }

    #[test]
    fn single_task_events_affect_one_task() {
        let event = GraphEvent::DependenciesChanged { id: "tl-a".into() };
        assert_eq!(event.affected(), vec![&TaskId::from("tl-a")]);
    }
}
