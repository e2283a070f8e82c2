//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so bad input is reported at parse
//! time.

use crate::domain::MAX_TITLE_LENGTH;
use chrono::{DateTime, NaiveDate, Utc};

/// Validate a task ID prefix. Delegates to [`crate::commands::init::validate_prefix`].
pub fn validate_prefix(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_prefix(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate task ID format: `prefix-suffix`, both alphanumeric.
pub fn validate_task_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Task ID cannot be empty".to_string());
    }

    let Some((prefix, suffix)) = s.split_once('-') else {
        return Err(format!(
            "Invalid task ID format: '{}'. Expected format: prefix-suffix (e.g., tl-a3f8)",
            s
        ));
    };

    validate_prefix(prefix).map_err(|e| format!("Task ID {}", e.to_lowercase()))?;

    if suffix.is_empty() {
        return Err("Task ID suffix cannot be empty".to_string());
    }
    if !suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Task ID suffix must contain only alphanumeric characters".to_string());
    }

    Ok(s.to_string())
}

/// Validate a task title: non-empty, single line, at most 200 characters.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    let len = s.chars().count();
    if len > MAX_TITLE_LENGTH {
        return Err(format!(
            "Title cannot exceed {} characters, got {} characters",
            MAX_TITLE_LENGTH, len
        ));
    }

    if s.contains('\n') || s.contains('\r') {
        return Err("Title cannot contain newline characters".to_string());
    }

    Ok(s.to_string())
}

/// Parse a due date given as RFC 3339 (`2025-03-01T17:00:00Z`) or as a plain
/// date (`2025-03-01`, taken as midnight UTC).
pub fn parse_due_date(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            format!(
                "Invalid due date '{}'. Use YYYY-MM-DD or an ISO 8601 timestamp",
                s
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::simple("tl-a3f8")]
    #[case::long_prefix("project42-zz9")]
    #[case::padded("  tl-abcd  ")]
    fn valid_task_ids(#[case] id: &str) {
        assert_eq!(validate_task_id(id).unwrap(), id.trim());
    }

    #[rstest]
    #[case::empty("", "cannot be empty")]
    #[case::no_hyphen("tla3f8", "Expected format")]
    #[case::short_prefix("t-a3f8", "at least 2")]
    #[case::empty_suffix("tl-", "suffix cannot be empty")]
    #[case::bad_suffix("tl-a_b", "alphanumeric")]
    fn invalid_task_ids(#[case] id: &str, #[case] expected: &str) {
        let err = validate_task_id(id).unwrap_err();
        assert!(err.contains(expected), "unexpected message: {}", err);
    }

    #[rstest]
    #[case::blank("   ", "cannot be empty")]
    #[case::newline("a\nb", "newline")]
    fn invalid_titles(#[case] title: &str, #[case] expected: &str) {
        assert!(validate_title(title).unwrap_err().contains(expected));
    }

    #[test]
    fn overlong_title_is_rejected() {
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH + 1)).is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LENGTH)).is_ok());
    }

    #[rstest]
    #[case::date("2025-03-01", "2025-03-01T00:00:00+00:00")]
    #[case::utc("2025-03-01T17:30:00Z", "2025-03-01T17:30:00+00:00")]
    #[case::offset("2025-03-01T17:30:00+02:00", "2025-03-01T15:30:00+00:00")]
    fn due_dates_parse(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(parse_due_date(input).unwrap().to_rfc3339(), expected);
    }

    #[test]
    fn garbage_due_date_fails() {
        assert!(parse_due_date("next tuesday").is_err());
    }
}
