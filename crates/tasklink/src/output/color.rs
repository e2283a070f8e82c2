//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green  (completed status, confirmations)
//!   - Warning/Active: yellow (in-progress status, high priority)
//!   - Error:          red    (failures)
//!   - Info/Reference: cyan   (task IDs)
//!   - Muted:          dimmed (field labels, low priority)
//!   - Emphasis:       bold   (titles, section headers)

use crate::domain::{Priority, TaskStatus};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

pub(crate) fn colorize_status(status: TaskStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        TaskStatus::Todo => text.white().to_string(),
        TaskStatus::InProgress => text.yellow().to_string(),
        TaskStatus::Completed => text.green().to_string(),
    }
}

pub(crate) fn colorize_priority(priority: Priority, config: &OutputConfig) -> String {
    let text = priority.to_string();
    if !config.use_colors {
        return text;
    }
    match priority {
        Priority::High => text.yellow().bold().to_string(),
        Priority::Medium => text,
        Priority::Low => text.dimmed().to_string(),
    }
}

pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Status icon, with ASCII fallback.
pub(crate) fn status_icon(status: TaskStatus, config: &OutputConfig) -> String {
    let icon = match (status, config.use_ascii) {
        (TaskStatus::Todo, true) => "o",
        (TaskStatus::InProgress, true) => ">",
        (TaskStatus::Completed, true) => "+",
        (TaskStatus::Todo, false) => "○",
        (TaskStatus::InProgress, false) => "▶",
        (TaskStatus::Completed, false) => "✓",
    };
    if !config.use_colors {
        return icon.to_string();
    }
    match status {
        TaskStatus::Todo => icon.white().to_string(),
        TaskStatus::InProgress => icon.yellow().to_string(),
        TaskStatus::Completed => icon.green().to_string(),
    }
}

pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}
