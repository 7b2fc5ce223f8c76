use super::enums::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque task identifier
///
/// New ids are UUID v4 strings; any string is accepted when loading older data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A timestamped entry in a task's activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A trackable unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Committed working time in seconds
    #[serde(default)]
    pub duration: u64,
    /// Free-form note or link, empty for none
    #[serde(default)]
    pub attachment: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Task {
    /// New task with default fields. Callers are responsible for trimming `text`.
    pub fn new(text: String) -> Self {
        Self {
            id: TaskId::generate(),
            text,
            completed: false,
            status: TaskStatus::ToDo,
            tags: Vec::new(),
            duration: 0,
            attachment: String::new(),
            comments: Vec::new(),
        }
    }

    pub fn has_attachment(&self) -> bool {
        !self.attachment.is_empty()
    }

    /// Tags joined the way the edit form shows them
    pub fn tags_joined(&self) -> String {
        self.tags.join(", ")
    }

    /// Apply a patch. Tags are normalized, text and attachment trimmed.
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(text) = patch.text {
            self.text = text.trim().to_string();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(attachment) = patch.attachment {
            self.attachment = attachment.trim().to_string();
        }
    }
}

/// Partial update for a task; `None` leaves the field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub status: Option<TaskStatus>,
    pub tags: Option<Vec<String>>,
    pub duration: Option<u64>,
    pub attachment: Option<String>,
}

impl TaskPatch {
    pub fn duration(seconds: u64) -> Self {
        Self {
            duration: Some(seconds),
            ..Self::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }
}

/// Trim, drop empties and drop exact duplicates (first occurrence wins)
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

/// Parse comma-separated tag input
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_task_new_defaults() {
        let task = Task::new("buy milk".to_string());
        assert_eq!(task.text, "buy milk");
        assert!(!task.completed);
        assert_eq!(task.status, TaskStatus::ToDo);
        assert!(task.tags.is_empty());
        assert_eq!(task.duration, 0);
        assert!(!task.has_attachment());
        assert!(task.comments.is_empty());
    }

    #[test]
    fn test_task_ids_are_unique() {
        let a = Task::new("a".to_string());
        let b = Task::new("b".to_string());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_parse_tags_normalizes() {
        assert_eq!(
            parse_tags(" work, ,Home,work,  urgent ,"),
            vec!["work".to_string(), "Home".to_string(), "urgent".to_string()]
        );
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn test_tags_keep_case() {
        assert_eq!(parse_tags("Work, work"), vec!["Work".to_string(), "work".to_string()]);
    }

    #[test]
    fn test_apply_patch() {
        let mut task = Task::new("draft".to_string());
        task.apply(TaskPatch {
            text: Some("  final  ".to_string()),
            status: Some(TaskStatus::Done),
            tags: Some(vec![" a ".to_string(), "".to_string(), "a".to_string()]),
            attachment: Some(" https://example.com ".to_string()),
            ..TaskPatch::default()
        });

        assert_eq!(task.text, "final");
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.tags, vec!["a".to_string()]);
        assert_eq!(task.attachment, "https://example.com");
        assert_eq!(task.duration, 0);
    }

    #[test]
    fn test_deserialize_legacy_record() {
        let json = r#"{
            "id": "1700000000000",
            "text": "Write report",
            "completed": true,
            "status": "In Progress",
            "tags": ["work"],
            "duration": 125,
            "attachment": "",
            "comments": [{"text": "started", "timestamp": "2024-03-01T10:15:00.000Z"}]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();

        assert_eq!(task.id.as_str(), "1700000000000");
        assert!(task.completed);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.duration, 125);
        assert_eq!(task.comments.len(), 1);
        assert_eq!(task.comments[0].timestamp.to_rfc3339(), "2024-03-01T10:15:00+00:00");
    }

    #[test]
    fn test_deserialize_missing_optional_fields() {
        let task: Task = serde_json::from_str(r#"{"id": "x", "text": "bare"}"#).unwrap();
        assert_eq!(task.status, TaskStatus::ToDo);
        assert!(task.tags.is_empty());
        assert_eq!(task.duration, 0);
        assert_eq!(task.attachment, "");
    }
}
