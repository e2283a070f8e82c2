//! CLI value enums and their domain conversions.

use clap::ValueEnum;

use crate::domain::{Priority, TaskStatus};

/// Task priority for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityArg {
    /// Can wait
    Low,
    /// Normal priority
    Medium,
    /// Needs attention first
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

/// Task status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    /// Not started
    Todo,
    /// Being worked on
    #[value(name = "in-progress", alias = "in_progress")]
    InProgress,
    /// Done
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Todo => TaskStatus::Todo,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Completed => TaskStatus::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::todo(StatusArg::Todo, TaskStatus::Todo)]
    #[case::in_progress(StatusArg::InProgress, TaskStatus::InProgress)]
    #[case::completed(StatusArg::Completed, TaskStatus::Completed)]
    fn status_converts(#[case] arg: StatusArg, #[case] expected: TaskStatus) {
        assert_eq!(TaskStatus::from(arg), expected);
    }

    #[test]
    fn status_accepts_both_spellings() {
        assert_eq!(
            StatusArg::from_str("in-progress", false).unwrap(),
            StatusArg::InProgress
        );
        assert_eq!(
            StatusArg::from_str("in_progress", false).unwrap(),
            StatusArg::InProgress
        );
    }
}
