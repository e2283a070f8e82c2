//! Cycle detection against the persisted dependency graph.

use crate::domain::TaskId;
use crate::error::Result;
use crate::store::TaskStore;
use std::collections::HashSet;

/// Returns `true` if adding the edge `subject -> candidate` would close a
/// cycle, i.e. `subject` is already reachable from `candidate`.
///
/// The identity case (`subject == candidate`) counts as a cycle. Referenced
/// tasks that no longer exist are treated as leaves.
///
/// Depth-first over the store with an explicit stack, so arbitrarily deep
/// chains cannot overflow the call stack. Each task is read at most once.
///
/// # Errors
///
/// Only store failures are returned.
pub async fn would_create_cycle(
    store: &dyn TaskStore,
    subject: &TaskId,
    candidate: &TaskId,
) -> Result<bool> {
    if subject == candidate {
        return Ok(true);
    }

    let mut visited: HashSet<TaskId> = HashSet::new();
    let mut stack = vec![candidate.clone()];

    while let Some(current) = stack.pop() {
        if &current == subject {
            return Ok(true);
        }
        if !visited.insert(current.clone()) {
            continue;
        }

        let Some(task) = store.get(&current).await? else {
            continue;
        };

        // Reversed so the first-listed dependency is explored first.
        for dep in task.dependencies.into_iter().rev() {
            if !visited.contains(&dep) {
                stack.push(dep);
            }
        }
    }

    Ok(false)
}
