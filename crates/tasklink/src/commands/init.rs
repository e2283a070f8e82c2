//! Repository initialization and configuration.
//!
//! `tasklink init` creates the `.tasklink/` directory:
//!
//! ```text
//! .tasklink/
//! ├── config.yaml   # prefix and storage settings
//! ├── tasks.jsonl   # task records, one per line
//! └── .gitignore
//! ```
//!
//! Other commands locate the repository by walking up from the working
//! directory with [`find_tasklink_root`].

use crate::error::{ConfigError, Result};
use crate::store::StoreBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default task ID prefix if none specified
pub const DEFAULT_PREFIX: &str = "tl";

/// Name of the repository directory
pub const TASKLINK_DIR_NAME: &str = ".tasklink";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the task data file
pub const TASKS_FILE_NAME: &str = "tasks.jsonl";

/// Name of the gitignore file within .tasklink
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the repository
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Contents of `.tasklink/config.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TasklinkConfig {
    /// Task ID prefix (e.g. "tl" for "tl-a3f8")
    #[serde(rename = "task-prefix")]
    pub task_prefix: String,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Backend name: "jsonl" (persistent) or "memory" (discarded on exit)
    pub backend: String,

    /// Data file path, relative to the repository root
    pub data_file: String,
}

impl StorageConfig {
    /// Resolve the configured backend against the repository root.
    ///
    /// # Errors
    ///
    /// - `ConfigError::UnknownBackend` for an unrecognized backend name
    pub fn to_backend(&self, root_dir: &Path) -> Result<StoreBackend> {
        match self.backend.as_str() {
            "jsonl" => Ok(StoreBackend::Jsonl(root_dir.join(&self.data_file))),
            "memory" => Ok(StoreBackend::InMemory),
            other => Err(ConfigError::UnknownBackend(other.to_string()).into()),
        }
    }
}

impl TasklinkConfig {
    /// Create a configuration with the given prefix and JSONL storage
    pub fn new(prefix: &str) -> Self {
        Self {
            task_prefix: prefix.to_string(),
            storage: StorageConfig {
                backend: "jsonl".to_string(),
                data_file: format!("{}/{}", TASKLINK_DIR_NAME, TASKS_FILE_NAME),
            },
        }
    }

    /// Load configuration from a file
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        validate_prefix(&config.task_prefix)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Yaml(format!("YAML error: {}", e)))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for TasklinkConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Paths created by [`init`]
#[derive(Debug)]
pub struct InitResult {
    /// The `.tasklink` directory
    pub tasklink_dir: PathBuf,
    /// The config file
    pub config_file: PathBuf,
    /// The task data file
    pub tasks_file: PathBuf,
    /// The gitignore file
    pub gitignore_file: PathBuf,
    /// The prefix used for task IDs
    pub prefix: String,
}

/// Validate task ID prefix format.
///
/// Requirements:
/// - 2-20 characters
/// - ASCII letters and digits only
///
/// Expects pre-trimmed input.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.len() < MIN_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "Prefix must be at least {} characters",
            MIN_PREFIX_LENGTH
        ))
        .into());
    }

    if prefix.len() > MAX_PREFIX_LENGTH {
        return Err(ConfigError::InvalidPrefix(format!(
            "Prefix cannot exceed {} characters",
            MAX_PREFIX_LENGTH
        ))
        .into());
    }

    if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidPrefix(
            "Prefix must contain only alphanumeric characters".to_string(),
        )
        .into());
    }

    Ok(())
}

/// Initialize a repository in `base_dir`.
///
/// # Errors
///
/// - `ConfigError::AlreadyInitialized` if `.tasklink/` already exists
/// - `ConfigError::InvalidPrefix` if the prefix is invalid
/// - `Error::Io` if files cannot be written
pub async fn init(base_dir: &Path, prefix: Option<&str>) -> Result<InitResult> {
    let prefix = prefix.unwrap_or(DEFAULT_PREFIX).trim();
    validate_prefix(prefix)?;

    let tasklink_dir = base_dir.join(TASKLINK_DIR_NAME);
    if tasklink_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(TASKLINK_DIR_NAME.to_string()).into());
    }

    fs::create_dir_all(&tasklink_dir).await?;

    let config_file = tasklink_dir.join(CONFIG_FILE_NAME);
    TasklinkConfig::new(prefix).save(&config_file).await?;

    let tasks_file = tasklink_dir.join(TASKS_FILE_NAME);
    fs::write(&tasks_file, "").await?;

    let gitignore_file = tasklink_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Leftovers from interrupted writes
*.tmp
";
    fs::write(&gitignore_file, gitignore_content).await?;

    tracing::info!(dir = %tasklink_dir.display(), prefix, "Initialized repository");

    Ok(InitResult {
        tasklink_dir,
        config_file,
        tasks_file,
        gitignore_file,
        prefix: prefix.to_string(),
    })
}

/// Returns `true` if `base_dir` contains a `.tasklink/` directory.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(TASKLINK_DIR_NAME).exists()
}

/// Find the directory containing `.tasklink/`, starting at `start_dir` and
/// walking up through its parents.
///
/// Returns `None` if no repository is found within [`MAX_TRAVERSAL_DEPTH`]
/// levels.
pub fn find_tasklink_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if is_initialized(&current) {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
