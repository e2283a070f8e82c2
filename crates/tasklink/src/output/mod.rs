//! Output formatting for CLI commands.
//!
//! Every printer supports human-readable text and JSON. Text printers write
//! to any `io::Write` so they can be tested against a buffer.

pub mod color;

use crate::domain::Task;
use crate::graph::DependencyReport;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success};

use color::{bold, colorize_id, colorize_priority, colorize_status, dimmed, status_icon};

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Settings for text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Use ANSI colors.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a config with explicit values.
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Read settings from the environment.
    ///
    /// - `NO_COLOR`: any value disables colors
    /// - `TASKLINK_COLOR`: "0" or "false" disables colors
    /// - `TASKLINK_ASCII`: "1" or "true" selects ASCII icons
    pub fn from_env() -> Self {
        let use_ascii = match env::var("TASKLINK_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false") => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "TASKLINK_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TASKLINK_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Print any serializable value as pretty JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)
}

/// Print a single task.
pub fn print_task(task: &Task, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(task),
        OutputMode::Text => {
            let stdout = io::stdout();
            write_task_text(&mut stdout.lock(), task, &OutputConfig::from_env())
        }
    }
}

/// Print a list of tasks.
pub fn print_tasks(tasks: &[Task], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(tasks),
        OutputMode::Text => {
            let stdout = io::stdout();
            write_tasks_text(&mut stdout.lock(), tasks, &OutputConfig::from_env())
        }
    }
}

/// Print a dependency report.
pub fn print_report(report: &DependencyReport, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => print_json(report),
        OutputMode::Text => {
            let stdout = io::stdout();
            write_report_text(&mut stdout.lock(), report, &OutputConfig::from_env())
        }
    }
}

/// Write the detail view of a task.
pub fn write_task_text<W: Write>(w: &mut W, task: &Task, config: &OutputConfig) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {}",
        status_icon(task.status, config),
        colorize_id(task.id.as_str(), config),
        bold(&task.title, config)
    )?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Status:  ", config),
        colorize_status(task.status, config)
    )?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Priority:", config),
        colorize_priority(task.priority, config)
    )?;
    if let Some(due) = task.due_date {
        writeln!(w, "  {} {}", dimmed("Due:     ", config), due.format("%Y-%m-%d %H:%M UTC"))?;
    }
    writeln!(
        w,
        "  {} {}",
        dimmed("Created: ", config),
        task.created_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(
        w,
        "  {} {}",
        dimmed("Updated: ", config),
        task.updated_at.format("%Y-%m-%d %H:%M UTC")
    )?;

    if !task.description.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", bold("Description:", config))?;
        for line in task.description.lines() {
            writeln!(w, "  {}", line)?;
        }
    }

    if !task.dependencies.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", bold("Depends on:", config))?;
        for dep in &task.dependencies {
            writeln!(w, "  {}", colorize_id(dep.as_str(), config))?;
        }
    }

    Ok(())
}

/// Write one line per task.
pub fn write_tasks_text<W: Write>(
    w: &mut W,
    tasks: &[Task],
    config: &OutputConfig,
) -> io::Result<()> {
    if tasks.is_empty() {
        return writeln!(w, "No tasks found.");
    }

    for task in tasks {
        let deps = if task.dependencies.is_empty() {
            String::new()
        } else {
            dimmed(&format!(" ({} deps)", task.dependencies.len()), config)
        };
        writeln!(
            w,
            "{} {} [{}] {}{}",
            status_icon(task.status, config),
            colorize_id(task.id.as_str(), config),
            colorize_priority(task.priority, config),
            task.title,
            deps
        )?;
    }
    writeln!(w)?;
    writeln!(w, "{} task(s)", tasks.len())
}

/// Write a dependency report grouped by level.
pub fn write_report_text<W: Write>(
    w: &mut W,
    report: &DependencyReport,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        colorize_id(report.task.id.as_str(), config),
        bold(&report.task.title, config)
    )?;

    if report.is_empty() {
        return writeln!(w, "  No dependencies.");
    }

    for (level, deps) in &report.dependencies_by_level {
        writeln!(w, "{}", bold(&format!("Level {}:", level), config))?;
        for dep in deps {
            writeln!(
                w,
                "  {} {} {}",
                status_icon(dep.status, config),
                colorize_id(dep.id.as_str(), config),
                dep.title
            )?;
        }
    }

    writeln!(w)?;
    writeln!(
        w,
        "{} dependencies ({} direct), depth {}",
        report.len(),
        report.direct_dependencies.len(),
        report.depth()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTask, TaskStatus};
    use crate::graph::DependencyGraph;
    use crate::store::InMemoryTaskStore;
    use std::sync::Arc;

    fn plain() -> OutputConfig {
        OutputConfig::new(true, false)
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn task_detail_lists_dependencies() {
        let graph = DependencyGraph::new(Arc::new(InMemoryTaskStore::new("tl".into())));
        let dep = graph.create_task(NewTask::titled("Schema"), &[]).await.unwrap();
        let task = graph
            .create_task(
                NewTask {
                    title: "Migrate".into(),
                    description: "Run it twice".into(),
                    ..Default::default()
                },
                &[dep.id.clone()],
            )
            .await
            .unwrap();

        let out = render(|w| write_task_text(w, &task, &plain()));
        assert!(out.starts_with(&format!("o {} Migrate", task.id)));
        assert!(out.contains("Status:   todo"));
        assert!(out.contains("Run it twice"));
        assert!(out.contains(&format!("Depends on:\n  {}", dep.id)));
    }

    #[test]
    fn empty_list_says_so() {
        let out = render(|w| write_tasks_text(w, &[], &plain()));
        assert_eq!(out, "No tasks found.\n");
    }

    #[tokio::test]
    async fn report_groups_by_level() {
        let graph = DependencyGraph::new(Arc::new(InMemoryTaskStore::new("tl".into())));
        let c = graph.create_task(NewTask::titled("C"), &[]).await.unwrap();
        let b = graph.create_task(NewTask::titled("B"), &[c.id.clone()]).await.unwrap();
        let a = graph.create_task(NewTask::titled("A"), &[b.id.clone()]).await.unwrap();
        graph
            .update_task(
                &c.id,
                crate::domain::TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let report = graph.get_all_dependencies(&a.id).await.unwrap();
        let out = render(|w| write_report_text(w, &report, &plain()));

        assert!(out.contains(&format!("Level 1:\n  o {} B", b.id)));
        assert!(out.contains(&format!("Level 2:\n  + {} C", c.id)));
        assert!(out.contains("2 dependencies (1 direct), depth 2"));
    }
}
