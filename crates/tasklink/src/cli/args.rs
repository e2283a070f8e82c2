//! CLI argument structs for all commands.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use super::types::{PriorityArg, StatusArg};
use super::validators::{parse_due_date, validate_prefix, validate_task_id, validate_title};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Task ID prefix (e.g., "tl" for "tl-a3f8")
    ///
    /// Must be 2-20 alphanumeric characters.
    #[arg(short, long, value_parser = validate_prefix)]
    pub prefix: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `create` command
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Task title (maximum 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: String,

    /// Detailed description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// Priority level
    #[arg(short, long, value_enum, default_value = "medium")]
    pub priority: PriorityArg,

    /// Due date (YYYY-MM-DD or ISO 8601 timestamp)
    #[arg(long, value_parser = parse_due_date)]
    pub due: Option<DateTime<Utc>>,

    /// Tasks this task depends on (comma-separated IDs)
    #[arg(long, value_delimiter = ',', value_parser = validate_task_id)]
    pub depends_on: Vec<String>,
}

/// Arguments for the `show` command
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Task ID to display
    #[arg(value_parser = validate_task_id)]
    pub task_id: String,
}

/// Arguments for the `update` command
#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Task ID to update
    #[arg(value_parser = validate_task_id)]
    pub task_id: String,

    /// New title (maximum 200 characters)
    #[arg(long, value_parser = validate_title)]
    pub title: Option<String>,

    /// New description
    #[arg(short = 'D', long)]
    pub description: Option<String>,

    /// New status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// New priority
    #[arg(short, long, value_enum)]
    pub priority: Option<PriorityArg>,

    /// New due date (YYYY-MM-DD or ISO 8601 timestamp)
    #[arg(long, value_parser = parse_due_date, conflicts_with = "clear_due")]
    pub due: Option<DateTime<Utc>>,

    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,

    /// Replace the dependency set (comma-separated IDs)
    #[arg(long, value_delimiter = ',', value_parser = validate_task_id, conflicts_with = "clear_deps")]
    pub depends_on: Vec<String>,

    /// Remove every dependency
    #[arg(long)]
    pub clear_deps: bool,
}

/// Arguments for the `delete` command
#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    /// Task ID to delete
    #[arg(value_parser = validate_task_id)]
    pub task_id: String,
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency action
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Make one task depend on another
    Add {
        /// Task that depends on another
        #[arg(value_parser = validate_task_id)]
        from: String,

        /// Task being depended on
        #[arg(value_parser = validate_task_id)]
        to: String,
    },

    /// Remove a dependency
    Remove {
        /// Task that depends on another
        #[arg(value_parser = validate_task_id)]
        from: String,

        /// Task being depended on
        #[arg(value_parser = validate_task_id)]
        to: String,
    },

    /// Show every direct and indirect dependency, grouped by level
    All {
        /// Task ID
        #[arg(value_parser = validate_task_id)]
        task_id: String,
    },
}
