//! Categorical encodings for task metadata.
//!
//! Every lookup is case-insensitive and falls back to a default code for
//! absent or unrecognised input; there is no error path.

/// Number of metadata entries in the assembled vector.
pub const METADATA_FEATURE_COUNT: usize = 3;

pub const METADATA_FEATURE_NAMES: [&str; METADATA_FEATURE_COUNT] =
    ["attachments_count", "priority_level", "task_type_level"];

pub const DEFAULT_PRIORITY: u8 = 2;
pub const DEFAULT_TASK_TYPE: u8 = 2;
pub const DEFAULT_COMPLEXITY: u8 = 2;

pub fn encode_priority(priority: Option<&str>) -> u8 {
    match priority.map(str::to_lowercase).as_deref() {
        Some("low" | "minor") => 1,
        Some("medium" | "normal" | "moderate") => 2,
        Some("high" | "critical" | "urgent") => 3,
        Some("blocker") => 4,
        _ => DEFAULT_PRIORITY,
    }
}

pub fn encode_task_type(task_type: Option<&str>) -> u8 {
    match task_type.map(str::to_lowercase).as_deref() {
        Some("bug" | "fix" | "hotfix") => 1,
        Some("feature" | "story" | "task" | "improvement" | "enhancement") => 2,
        Some("epic" | "integration" | "migration" | "research") => 3,
        _ => DEFAULT_TASK_TYPE,
    }
}

/// Complexity labels found in some datasets. Diagnostic only, never a model input.
pub fn encode_complexity(complexity: Option<&str>) -> u8 {
    match complexity.map(str::to_lowercase).as_deref() {
        Some("low" | "simple" | "easy") => 1,
        Some("medium" | "moderate" | "normal") => 2,
        Some("high" | "complex" | "hard" | "difficult") => 3,
        _ => DEFAULT_COMPLEXITY,
    }
}

pub fn encode_attachments(attachments_count: Option<u32>) -> u32 {
    attachments_count.unwrap_or(0)
}
