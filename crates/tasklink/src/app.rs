//! Application context for CLI command execution.
//!
//! # Example
//!
//! ```no_run
//! use tasklink::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     for task in app.graph().list_tasks().await? {
//!         println!("{} {}", task.id, task.title);
//!     }
//!     Ok(())
//! }
//! ```

use crate::cache::TaskCache;
use crate::commands::init::{
    find_tasklink_root, TasklinkConfig, CONFIG_FILE_NAME, TASKLINK_DIR_NAME,
};
use crate::error::{ConfigError, Result};
use crate::graph::DependencyGraph;
use crate::store::create_store;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Store, graph engine and read cache for one repository.
///
/// The CLI opens an `App` per invocation and reads through the graph
/// directly; a fresh cache would never hit. Embedders that keep an `App`
/// open across many requests read through [`App::cache`] instead, which
/// stays current because it observes every mutation made via
/// [`App::graph`].
pub struct App {
    graph: DependencyGraph,
    cache: Arc<TaskCache>,
    tasklink_dir: PathBuf,
    prefix: String,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("tasklink_dir", &self.tasklink_dir)
            .field("prefix", &self.prefix)
            .field("graph", &"<DependencyGraph>")
            .finish()
    }
}

impl App {
    /// Open the repository containing `working_dir`.
    ///
    /// Searches up the directory tree for `.tasklink/`, loads its
    /// configuration and opens the configured store.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotInitialized` if no repository is found
    /// - configuration or store errors while loading
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_tasklink_root(working_dir).ok_or(ConfigError::NotInitialized)?;

        let tasklink_dir = root_dir.join(TASKLINK_DIR_NAME);
        let config = TasklinkConfig::load(&tasklink_dir.join(CONFIG_FILE_NAME)).await?;

        let backend = config.storage.to_backend(&root_dir)?;
        let store = create_store(backend, config.task_prefix.clone()).await?;

        let cache = Arc::new(TaskCache::default());
        let graph = DependencyGraph::new(store).with_observer(cache.clone());

        Ok(Self {
            graph,
            cache,
            tasklink_dir,
            prefix: config.task_prefix,
        })
    }

    /// The dependency-graph engine.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Read cache kept current by graph events, for long-lived callers.
    pub fn cache(&self) -> &TaskCache {
        &self.cache
    }

    /// Task ID prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path to the `.tasklink` directory.
    pub fn tasklink_dir(&self) -> &Path {
        &self.tasklink_dir
    }

    /// Persist the store. Call after mutating commands.
    pub async fn save(&self) -> Result<()> {
        self.graph.flush().await
    }
}
