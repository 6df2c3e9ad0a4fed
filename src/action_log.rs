//! Action logging for SchemeLand commands.
//!
//! Every CLI invocation is appended as one JSONL record to `action.log` in
//! the profile's data directory. Logging never fails a command: any error
//! here degrades to a warning on stderr.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Represents a single action log entry.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionLog {
    /// ISO 8601 timestamp when the action occurred
    pub timestamp: DateTime<Utc>,

    /// Profile the command ran against
    pub profile: String,

    /// Command name (e.g., "idea create", "project commit")
    pub command: String,

    /// Command arguments as JSON
    pub args: serde_json::Value,

    /// Whether the command succeeded
    pub success: bool,

    /// Error message if the command failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Command execution duration in milliseconds
    pub duration_ms: u64,

    /// User who executed the command
    pub user: String,
}

/// Log an action to the profile's log file.
///
/// This function never fails - it silently falls back on errors to avoid
/// breaking commands due to logging issues.
pub fn log_action(
    data_dir: &Path,
    profile: &str,
    command: &str,
    args: serde_json::Value,
    success: bool,
    error: Option<String>,
    duration_ms: u64,
) {
    let entry = ActionLog {
        timestamp: Utc::now(),
        profile: profile.to_string(),
        command: command.to_string(),
        args: sanitize_args(&args),
        success,
        error,
        duration_ms,
        user: get_current_user(),
    };

    if let Err(e) = write_log_entry(&data_dir.join("action.log"), &entry) {
        eprintln!("Warning: Failed to write action log: {}", e);
    }
}

/// Write a log entry to the log file.
fn write_log_entry(path: &Path, entry: &ActionLog) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string(entry)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", json)?;

    Ok(())
}

/// Key substrings whose values are always redacted.
const SENSITIVE_KEY_MARKERS: &[&str] = &["password", "token", "key", "secret"];

/// Maximum array length logged verbatim.
const MAX_LOGGED_ARRAY: usize = 10;

/// Maximum string length logged verbatim.
const MAX_LOGGED_STRING: usize = 100;

/// Sanitize arguments: redact sensitive keys, summarize large arrays,
/// truncate long strings.
fn sanitize_args(args: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match args {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let lower = key.to_lowercase();
                    let sanitized = if SENSITIVE_KEY_MARKERS.iter().any(|m| lower.contains(m)) {
                        Value::String("[REDACTED]".to_string())
                    } else {
                        sanitize_args(value)
                    };
                    (key.clone(), sanitized)
                })
                .collect(),
        ),
        Value::Array(items) if items.len() > MAX_LOGGED_ARRAY => {
            Value::String(format!("[Array with {} items]", items.len()))
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize_args).collect()),
        Value::String(s) if s.len() > MAX_LOGGED_STRING => {
            let head: String = s.chars().take(97).collect();
            Value::String(format!("{}... ({} chars)", head, s.len()))
        }
        _ => args.clone(),
    }
}

/// Get the current user's username.
fn get_current_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sensitive_keys() {
        let value = serde_json::json!({
            "title": "My scheme",
            "api_token": "abc123",
            "password": "hunter2"
        });
        let sanitized = sanitize_args(&value);
        assert_eq!(sanitized["title"], "My scheme");
        assert_eq!(sanitized["api_token"], "[REDACTED]");
        assert_eq!(sanitized["password"], "[REDACTED]");
    }

    #[test]
    fn test_sanitize_large_array() {
        let arr: Vec<i32> = (0..15).collect();
        let sanitized = sanitize_args(&serde_json::json!(arr));
        assert_eq!(sanitized, serde_json::json!("[Array with 15 items]"));
    }

    #[test]
    fn test_sanitize_long_string() {
        let long = "a".repeat(150);
        let sanitized = sanitize_args(&serde_json::json!(long));
        if let serde_json::Value::String(s) = sanitized {
            assert!(s.contains("... (150 chars)"));
        } else {
            panic!("Expected string value");
        }
    }

    #[test]
    fn test_log_action_appends_jsonl() {
        let dir = tempfile::TempDir::new().unwrap();
        log_action(
            dir.path(),
            "default",
            "idea create",
            serde_json::json!({"title": "Test"}),
            true,
            None,
            12,
        );
        log_action(
            dir.path(),
            "default",
            "idea delete",
            serde_json::json!({"id": "sli-000000"}),
            false,
            Some("not found".to_string()),
            3,
        );

        let raw = std::fs::read_to_string(dir.path().join("action.log")).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ActionLog = serde_json::from_str(lines[0]).unwrap();
        assert!(first.success);
        let second: ActionLog = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.error.as_deref(), Some("not found"));
    }
}
