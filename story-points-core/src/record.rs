//! Task records and their ingestion from loosely shaped JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Candidate keys per field, tried in order; the first present key wins.
pub const TITLE_KEYS: &[&str] = &["title", "Title", "summary"];
pub const DESCRIPTION_KEYS: &[&str] =
    &["description", "Description", "user_story", "acceptance_criteria"];
pub const TARGET_KEYS: &[&str] =
    &["storyPoint", "story_point", "story_points", "points", "point", "sp"];
pub const TASK_TYPE_KEYS: &[&str] = &["task_type", "label", "type"];
pub const PRIORITY_KEYS: &[&str] = &["priority", "Priority"];
pub const ATTACHMENT_KEYS: &[&str] = &["attachments_count", "attachments"];
pub const COMPLEXITY_KEYS: &[&str] = &["complexity"];

/// A work item to estimate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, alias = "label")]
    pub task_type: Option<String>,
    #[serde(default)]
    pub attachments_count: Option<u32>,
}

impl TaskRecord {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    pub fn with_attachments(mut self, count: u32) -> Self {
        self.attachments_count = Some(count);
        self
    }

    /// Title and description as fed to the term encoder.
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }
}

/// A task with its known story point value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(flatten)]
    pub task: TaskRecord,
    pub story_points: f64,
    /// Dataset complexity label; diagnostic only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
}

impl TrainingRecord {
    pub fn new(task: TaskRecord, story_points: f64) -> Self {
        Self {
            task,
            story_points,
            complexity: None,
        }
    }

    /// Read a record from a JSON object.
    ///
    /// Returns `None` when the value is not an object, the title or the
    /// description is missing or blank, or no numeric target can be found.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let title = first_string(object, TITLE_KEYS)?;
        if title.trim().is_empty() {
            return None;
        }
        let description = first_string(object, DESCRIPTION_KEYS)?;
        if description.trim().is_empty() {
            return None;
        }
        let story_points = first_number(object, TARGET_KEYS)?;

        let task = TaskRecord {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            priority: first_string(object, PRIORITY_KEYS),
            task_type: first_string(object, TASK_TYPE_KEYS),
            attachments_count: first_number(object, ATTACHMENT_KEYS)
                .filter(|n| *n >= 0.0)
                .map(|n| n as u32),
        };

        Some(Self {
            task,
            story_points,
            complexity: first_string(object, COMPLEXITY_KEYS),
        })
    }

    /// Parse every element of `values`, silently dropping invalid ones.
    pub fn collect_valid(values: &[Value]) -> Vec<Self> {
        values.iter().filter_map(Self::from_json).collect()
    }
}

fn first_present<'a>(
    object: &'a serde_json::Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| !value.is_null())
}

fn first_string(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first_present(object, keys)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn first_number(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let number = match first_present(object, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}
