//! Command execution logic.

use anyhow::Result;

use super::args::{CreateArgs, DeleteArgs, DepAction, DepArgs, InitArgs, ShowArgs, UpdateArgs};
use crate::app::App;
use crate::domain::{NewTask, Task, TaskId, TaskUpdate};
use crate::output::{self, OutputConfig, OutputMode};

/// Execute the init command
pub async fn execute_init(args: &InitArgs) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir, args.prefix.as_deref()).await?;

    if !args.quiet {
        println!("Initialized tasklink in {}", result.tasklink_dir.display());
        println!("  Config: {}", result.config_file.display());
        println!("  Tasks:  {}", result.tasks_file.display());
        println!("  Task prefix: {}", result.prefix);
    }

    Ok(())
}

/// Execute the create command
pub async fn execute_create(app: &App, args: &CreateArgs, output_mode: OutputMode) -> Result<()> {
    let fields = NewTask {
        title: args.title.clone(),
        description: args.description.clone().unwrap_or_default(),
        due_date: args.due,
        priority: args.priority.into(),
    };
    let dependencies = to_ids(&args.depends_on);

    let task = app.graph().create_task(fields, &dependencies).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&task)?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!("{} {}", output::success("Created task:", &config), task.id);
        }
    }

    Ok(())
}

/// Execute the list command
pub async fn execute_list(app: &App, output_mode: OutputMode) -> Result<()> {
    let tasks = app.graph().list_tasks().await?;
    output::print_tasks(&tasks, output_mode)?;
    Ok(())
}

/// Execute the show command
pub async fn execute_show(app: &App, args: &ShowArgs, output_mode: OutputMode) -> Result<()> {
    let task = app.graph().get_task(&TaskId::new(&args.task_id)).await?;
    output::print_task(&task, output_mode)?;
    Ok(())
}

/// Execute the update command
pub async fn execute_update(app: &App, args: &UpdateArgs, output_mode: OutputMode) -> Result<()> {
    let update = update_from_args(args);
    if update.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one field flag (see --help)");
    }

    let task = app
        .graph()
        .update_task(&TaskId::new(&args.task_id), update)
        .await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&task)?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!("{} {}", output::success("Updated task:", &config), task.id);
        }
    }

    Ok(())
}

/// Execute the delete command
pub async fn execute_delete(app: &App, args: &DeleteArgs, output_mode: OutputMode) -> Result<()> {
    let id = TaskId::new(&args.task_id);
    let cascaded = app.graph().delete_task(&id).await?;
    app.save().await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "deleted": id,
            "cascaded": cascaded,
        }))?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!("{} {}", output::success("Deleted task:", &config), id);
            if !cascaded.is_empty() {
                println!("  Removed from {} dependent task(s)", cascaded.len());
            }
        }
    }

    Ok(())
}

/// Execute the dep command
pub async fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        DepAction::Add { from, to } => {
            let task = app
                .graph()
                .add_dependency(&TaskId::new(from), &TaskId::new(to))
                .await?;
            app.save().await?;
            print_dep_change(&task, output_mode, &format!("{} now depends on {}", from, to))
        }
        DepAction::Remove { from, to } => {
            let task = app
                .graph()
                .remove_dependency(&TaskId::new(from), &TaskId::new(to))
                .await?;
            app.save().await?;
            print_dep_change(
                &task,
                output_mode,
                &format!("{} no longer depends on {}", from, to),
            )
        }
        DepAction::All { task_id } => {
            let report = app
                .graph()
                .get_all_dependencies(&TaskId::new(task_id))
                .await?;
            output::print_report(&report, output_mode)?;
            Ok(())
        }
    }
}

fn print_dep_change(task: &Task, output_mode: OutputMode, message: &str) -> Result<()> {
    match output_mode {
        OutputMode::Json => output::print_json(task)?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!("{}", output::success(message, &config));
        }
    }
    Ok(())
}

fn to_ids(raw: &[String]) -> Vec<TaskId> {
    raw.iter().map(|id| TaskId::new(id.as_str())).collect()
}

fn update_from_args(args: &UpdateArgs) -> TaskUpdate {
    let due_date = if args.clear_due {
        Some(None)
    } else {
        args.due.map(Some)
    };
    let dependencies = if args.clear_deps {
        Some(Vec::new())
    } else if args.depends_on.is_empty() {
        None
    } else {
        Some(to_ids(&args.depends_on))
    };

    TaskUpdate {
        title: args.title.clone(),
        description: args.description.clone(),
        due_date,
        priority: args.priority.map(Into::into),
        status: args.status.map(Into::into),
        dependencies,
    }
}
