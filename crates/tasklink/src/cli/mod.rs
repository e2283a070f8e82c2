//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a new tasklink repository
//! - `create`: Create a task, optionally with dependencies
//! - `list`: List all tasks, newest first
//! - `show`: Show task details
//! - `update`: Update task fields or replace its dependencies
//! - `delete`: Delete a task and strip it from its dependents
//! - `dep add|remove|all`: Manage dependencies and inspect the full closure
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! tasklink create --title "Design schema" --priority high
//! tasklink create --title "Write migration" --depends-on tl-a3f8
//! tasklink dep all tl-b71c
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{CreateArgs, DeleteArgs, DepAction, DepArgs, InitArgs, ShowArgs, UpdateArgs};
pub use types::{PriorityArg, StatusArg};
pub use validators::{parse_due_date, validate_prefix, validate_task_id, validate_title};

/// tasklink - tasks with dependencies
///
/// Tracks tasks and the dependencies between them. The dependency graph is
/// kept free of cycles. Tasks are stored in `.tasklink/tasks.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "tasklink")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new tasklink repository
    ///
    /// Creates the `.tasklink/` directory with configuration and an empty
    /// task file.
    Init(InitArgs),

    /// Create a new task
    ///
    /// Dependencies given with `--depends-on` are checked for existence and
    /// cycles; if any check fails, no task is created.
    Create(CreateArgs),

    /// List all tasks, newest first
    List,

    /// Show detailed information about a task
    Show(ShowArgs),

    /// Update an existing task
    ///
    /// Only provided fields are changed. `--depends-on` replaces the whole
    /// dependency set.
    Update(UpdateArgs),

    /// Delete a task permanently
    ///
    /// The task is also removed from the dependency set of every task that
    /// depends on it.
    Delete(DeleteArgs),

    /// Manage dependencies between tasks
    Dep(DepArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args).await,
            Some(Commands::Create(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_create(&app, args, output_mode).await
            }
            Some(Commands::List) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_list(&app, output_mode).await
            }
            Some(Commands::Show(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_show(&app, args, output_mode).await
            }
            Some(Commands::Update(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_update(&app, args, output_mode).await
            }
            Some(Commands::Delete(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_delete(&app, args, output_mode).await
            }
            Some(Commands::Dep(args)) => {
                let app = App::from_directory(&std::env::current_dir()?).await?;
                execute::execute_dep(&app, args, output_mode).await
            }
            None => {
                println!("tasklink task dependency tracker");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }
}
