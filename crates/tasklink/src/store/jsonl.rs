//! JSONL-backed task store.
//!
//! Tasks are held in an [`InMemoryTaskStore`] and written to a JSON Lines file
//! (one serialized [`Task`] per line) on [`TaskStore::flush`].
//!
//! # Loading
//!
//! Loading is resilient. A damaged file never prevents the store from
//! opening; problems are skipped and reported as [`LoadWarning`]s:
//!
//! 1. Lines that are not valid task JSON are skipped
//! 2. Tasks that fail field validation, or repeat an earlier ID, are skipped
//! 3. Dependency edges to tasks missing from the file are dropped
//! 4. Dependency edges that would close a cycle are dropped, in file order
//!
//! After loading, every dependency set references an existing task and the
//! relation is acyclic.
//!
//! # Atomicity
//!
//! `flush` writes to a sibling `.tmp` file and renames it over the target, so
//! a crash mid-write leaves the previous file intact.

use crate::domain::{dedup_ids, NewTask, Task, TaskId};
use crate::error::Result;
use crate::store::{InMemoryTaskStore, TaskStore};
use async_trait::async_trait;
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::debug;

/// Non-fatal problem found while loading a JSONL file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line could not be parsed as a task; the line is skipped.
    MalformedJson {
        /// 1-based line number in the file
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A dependency references a task that is not in the file; the edge is
    /// dropped.
    OrphanedDependency {
        /// Task carrying the dependency
        from: TaskId,
        /// Missing dependency
        to: TaskId,
    },

    /// A dependency would close a cycle; the edge is dropped.
    CircularDependency {
        /// Task carrying the dependency
        from: TaskId,
        /// Dependency that already reaches `from`
        to: TaskId,
    },

    /// A parsed task failed validation; the whole task is skipped.
    InvalidTaskData {
        /// ID of the skipped task
        task_id: TaskId,
        /// 1-based line number in the file
        line_number: usize,
        /// Validation message
        error: String,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedJson { line_number, error } => {
                write!(f, "line {}: malformed JSON: {}", line_number, error)
            }
            LoadWarning::OrphanedDependency { from, to } => {
                write!(f, "skipped dependency {} -> {}: target does not exist", from, to)
            }
            LoadWarning::CircularDependency { from, to } => {
                write!(f, "skipped dependency {} -> {}: would create a cycle", from, to)
            }
            LoadWarning::InvalidTaskData {
                task_id,
                line_number,
                error,
            } => write!(f, "line {}: skipped task {}: {}", line_number, task_id, error),
        }
    }
}

/// Persistent [`TaskStore`] backed by a JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlTaskStore {
    inner: InMemoryTaskStore,
    path: PathBuf,
}

impl JsonlTaskStore {
    /// Open the store at `path`, loading any tasks the file holds.
    ///
    /// A missing file yields an empty store; it is created on the first
    /// flush.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if the file exists but cannot be read
    pub async fn open(
        path: impl Into<PathBuf>,
        prefix: String,
    ) -> Result<(Self, Vec<LoadWarning>)> {
        let path = path.into();

        let (tasks, warnings) = if tokio::fs::try_exists(&path).await? {
            load_tasks(&path).await?
        } else {
            debug!(path = %path.display(), "No data file yet, starting empty");
            (Vec::new(), Vec::new())
        };

        debug!(
            path = %path.display(),
            tasks = tasks.len(),
            warnings = warnings.len(),
            "Loaded tasks"
        );

        let store = Self {
            inner: InMemoryTaskStore::with_tasks(prefix, tasks),
            path,
        };
        Ok((store, warnings))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TaskStore for JsonlTaskStore {
    async fn get(&self, id: &TaskId) -> Result<Option<Task>> {
        self.inner.get(id).await
    }

    async fn exists(&self, id: &TaskId) -> Result<bool> {
        self.inner.exists(id).await
    }

    async fn find_referencing(&self, id: &TaskId) -> Result<Vec<Task>> {
        self.inner.find_referencing(id).await
    }

    async fn create(&self, fields: NewTask) -> Result<Task> {
        self.inner.create(fields).await
    }

    async fn save(&self, task: Task) -> Result<Task> {
        self.inner.save(task).await
    }

    async fn delete(&self, id: &TaskId) -> Result<()> {
        self.inner.delete(id).await
    }

    async fn list(&self) -> Result<Vec<Task>> {
        self.inner.list().await
    }

    async fn commit_cascade(&self, dependents: Vec<Task>, removed: &TaskId) -> Result<()> {
        self.inner.commit_cascade(dependents, removed).await
    }

    async fn flush(&self) -> Result<()> {
        let mut tasks = self.inner.list().await?;
        // Stable line order keeps diffs of the data file small.
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        write_atomic(&self.path, &tasks).await?;
        debug!(path = %self.path.display(), tasks = tasks.len(), "Flushed tasks");
        Ok(())
    }
}

async fn load_tasks(path: &Path) -> Result<(Vec<Task>, Vec<LoadWarning>)> {
    let mut warnings = Vec::new();

    // First pass: parse and validate each line.
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    let mut line_number = 0;
    let mut parsed: Vec<Task> = Vec::new();
    let mut seen: HashMap<TaskId, usize> = HashMap::new();

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let task: Task = match serde_json::from_str(&line) {
            Ok(task) => task,
            Err(e) => {
                warnings.push(LoadWarning::MalformedJson {
                    line_number,
                    error: e.to_string(),
                });
                continue;
            }
        };

        if let Err(error) = task.validate() {
            warnings.push(LoadWarning::InvalidTaskData {
                task_id: task.id,
                line_number,
                error,
            });
            continue;
        }
        if let Some(first) = seen.get(&task.id) {
            warnings.push(LoadWarning::InvalidTaskData {
                error: format!("duplicate ID (first seen on line {})", first),
                task_id: task.id,
                line_number,
            });
            continue;
        }

        seen.insert(task.id.clone(), line_number);
        parsed.push(task);
    }

    // Second pass: one graph node per task.
    let mut graph: DiGraph<TaskId, ()> = DiGraph::new();
    let node_map: HashMap<TaskId, NodeIndex> = parsed
        .iter()
        .map(|task| (task.id.clone(), graph.add_node(task.id.clone())))
        .collect();

    // Third pass: rebuild dependency sets, dropping orphans and cycle edges.
    for task in &mut parsed {
        let requested = dedup_ids(&task.dependencies);
        let mut kept = Vec::with_capacity(requested.len());
        let from_node = node_map[&task.id];

        for dep in requested {
            let Some(&to_node) = node_map.get(&dep) else {
                warnings.push(LoadWarning::OrphanedDependency {
                    from: task.id.clone(),
                    to: dep,
                });
                continue;
            };

            if from_node == to_node || has_path_connecting(&graph, to_node, from_node, None) {
                warnings.push(LoadWarning::CircularDependency {
                    from: task.id.clone(),
                    to: dep,
                });
                continue;
            }

            graph.add_edge(from_node, to_node, ());
            kept.push(dep);
        }

        task.dependencies = kept;
    }

    Ok((parsed, warnings))
}

async fn write_atomic(path: &Path, tasks: &[Task]) -> Result<()> {
    let temp_path = temp_path_for(path);

    if let Err(e) = write_lines(&temp_path, tasks).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

async fn write_lines(temp_path: &Path, tasks: &[Task]) -> Result<()> {
    let file = File::create(temp_path).await?;
    let mut writer = BufWriter::new(file);

    for task in tasks {
        let json = serde_json::to_string(task)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    Ok(())
}

/// `tasks.jsonl` -> `tasks.jsonl.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp_path = path.to_path_buf();
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => OsString::from("tmp"),
    };
    temp_path.set_extension(extension);
    temp_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Priority;
    use tempfile::TempDir;

    fn line(id: &str, deps: &[&str]) -> String {
        let deps: Vec<String> = deps.iter().map(|d| format!("\"{}\"", d)).collect();
        format!(
            r#"{{"id":"{}","title":"Task {}","dependencies":[{}],"createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z","revision":1}}"#,
            id,
            id,
            deps.join(",")
        )
    }

    async fn open_with(contents: &str) -> (TempDir, JsonlTaskStore, Vec<LoadWarning>) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.jsonl");
        tokio::fs::write(&path, contents).await.unwrap();
        let (store, warnings) = JsonlTaskStore::open(&path, "tl".into()).await.unwrap();
        (temp_dir, store, warnings)
    }

    #[tokio::test]
    async fn flush_then_reopen_preserves_tasks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.jsonl");

        let (store, _) = JsonlTaskStore::open(&path, "tl".into()).await.unwrap();
        let dep = store
            .create(NewTask {
                title: "Dependency".into(),
                priority: Priority::High,
                ..Default::default()
            })
            .await
            .unwrap();
        let mut task = store.create(NewTask::titled("Dependent")).await.unwrap();
        task.dependencies.push(dep.id.clone());
        let task = store.save(task).await.unwrap();
        store.flush().await.unwrap();

        assert!(!temp_path_for(&path).exists());

        let (reopened, warnings) = JsonlTaskStore::open(&path, "tl".into()).await.unwrap();
        assert!(warnings.is_empty());
        assert_eq!(reopened.get(&task.id).await.unwrap(), Some(task));
        assert_eq!(
            reopened.get(&dep.id).await.unwrap().unwrap().priority,
            Priority::High
        );
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let contents = format!("{}\nnot json\n\n{}\n", line("tl-a", &[]), line("tl-b", &["tl-a"]));
        let (_dir, store, warnings) = open_with(&contents).await;

        assert_eq!(store.list().await.unwrap().len(), 2);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            LoadWarning::MalformedJson { line_number: 2, .. }
        ));
    }

    #[tokio::test]
    async fn orphaned_dependencies_are_dropped() {
        let (_dir, store, warnings) = open_with(&line("tl-a", &["tl-gone"])).await;

        let task = store.get(&TaskId::from("tl-a")).await.unwrap().unwrap();
        assert!(task.dependencies.is_empty());
        assert_eq!(
            warnings,
            vec![LoadWarning::OrphanedDependency {
                from: "tl-a".into(),
                to: "tl-gone".into(),
            }]
        );
    }

    #[tokio::test]
    async fn cycle_edges_are_broken_in_file_order() {
        let contents = [
            line("tl-a", &["tl-b"]),
            line("tl-b", &["tl-c"]),
            line("tl-c", &["tl-a"]),
            line("tl-d", &["tl-d"]),
        ]
        .join("\n");
        let (_dir, store, warnings) = open_with(&contents).await;

        let c = store.get(&TaskId::from("tl-c")).await.unwrap().unwrap();
        assert!(c.dependencies.is_empty());
        let a = store.get(&TaskId::from("tl-a")).await.unwrap().unwrap();
        assert_eq!(a.dependencies, vec![TaskId::from("tl-b")]);

        assert_eq!(
            warnings,
            vec![
                LoadWarning::CircularDependency {
                    from: "tl-c".into(),
                    to: "tl-a".into(),
                },
                LoadWarning::CircularDependency {
                    from: "tl-d".into(),
                    to: "tl-d".into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn invalid_and_duplicate_tasks_are_skipped() {
        let blank = line("tl-x", &[]).replace("Task tl-x", " ");
        let contents = [line("tl-a", &[]), blank, line("tl-a", &[])].join("\n");
        let (_dir, store, warnings) = open_with(&contents).await;

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            &warnings[0],
            LoadWarning::InvalidTaskData { line_number: 2, .. }
        ));
        assert!(warnings[1].to_string().contains("duplicate ID"));
    }

    #[tokio::test]
    async fn loaded_ids_are_not_reissued() {
        let (_dir, store, _) = open_with(&line("tl-a", &[])).await;
        let created = store.create(NewTask::titled("New")).await.unwrap();
        assert_ne!(created.id.as_str(), "tl-a");
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[test]
    fn temp_path_appends_tmp() {
        assert_eq!(
            temp_path_for(Path::new("/x/tasks.jsonl")),
            PathBuf::from("/x/tasks.jsonl.tmp")
        );
        assert_eq!(temp_path_for(Path::new("/x/tasks")), PathBuf::from("/x/tasks.tmp"));
    }
}
