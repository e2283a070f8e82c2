//! Shared helpers for tasklink integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;
use tasklink::domain::{NewTask, Task, TaskId};
use tasklink::error::{Error, Result};
use tasklink::graph::DependencyGraph;
use tasklink::store::{InMemoryTaskStore, TaskStore};

/// A store whose every call fails as if the backend were down.
pub struct UnavailableStore;

fn down<T>() -> Result<T> {
    Err(Error::StoreUnavailable("connection refused".to_string()))
}

#[async_trait]
impl TaskStore for UnavailableStore {
    async fn get(&self, _id: &TaskId) -> Result<Option<Task>> {
        down()
    }

    async fn find_referencing(&self, _id: &TaskId) -> Result<Vec<Task>> {
        down()
    }

    async fn create(&self, _fields: NewTask) -> Result<Task> {
        down()
    }

    async fn save(&self, _task: Task) -> Result<Task> {
        down()
    }

    async fn delete(&self, _id: &TaskId) -> Result<()> {
        down()
    }

    async fn list(&self) -> Result<Vec<Task>> {
        down()
    }
}

/// An engine over a fresh in-memory store, plus the store itself.
pub fn memory_graph() -> (DependencyGraph, InMemoryTaskStore) {
    let store = InMemoryTaskStore::new("tl".to_string());
    let graph = DependencyGraph::new(Arc::new(store.clone()));
    (graph, store)
}

/// Create a task titled `title` that depends on `deps`.
pub async fn task(graph: &DependencyGraph, title: &str, deps: &[&Task]) -> Task {
    let ids: Vec<TaskId> = deps.iter().map(|t| t.id.clone()).collect();
    graph
        .create_task(NewTask::titled(title), &ids)
        .await
        .expect("Failed to create task")
}

/// Path to the compiled `tasklink` binary.
pub fn tasklink_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tasklink"))
}

/// Run the CLI in `dir` with colors disabled.
pub fn run_tasklink_in_dir(dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(tasklink_bin())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute tasklink")
}

/// Create a task through the CLI and return its ID.
pub fn create_task_cli(dir: &std::path::Path, title: &str, depends_on: Option<&str>) -> String {
    let mut args = vec!["--json", "create", "--title", title];
    if let Some(deps) = depends_on {
        args.extend_from_slice(&["--depends-on", deps]);
    }
    let output = run_tasklink_in_dir(dir, &args);
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("create output should be JSON");
    json["id"]
        .as_str()
        .expect("created task should carry an id")
        .to_string()
}
