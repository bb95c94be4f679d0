use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Persisted merged learning-path document. Rows are immutable; regenerating
/// a path inserts a new row for the same student.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LearningPath {
    pub id: Uuid,
    pub student_id: Uuid,
    pub path_data: JsonValue,
    pub created_at: DateTime<Utc>,
}

/// One entry of a path document's `topics` list, read leniently: absent
/// fields become empty strings/collections, difficulty defaults to medium.
#[derive(Debug, Clone, Default)]
pub struct TopicContext {
    pub title: String,
    pub description: String,
    pub objectives: Vec<String>,
    pub difficulty: String,
}

impl TopicContext {
    pub fn from_value(value: &JsonValue) -> Self {
        Self {
            title: str_field(value, "title", ""),
            description: str_field(value, "description", ""),
            objectives: string_list(value.get("objectives")),
            difficulty: str_field(value, "difficulty", "medium"),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Unknown Topic"
        } else {
            &self.title
        }
    }
}

/// Student context for task prompts, read from the stored path document.
#[derive(Debug, Clone)]
pub struct StudentProfile {
    pub grade_level: String,
    pub learning_style: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

impl StudentProfile {
    pub fn from_path_data(path_data: &JsonValue) -> Self {
        Self {
            grade_level: str_field(path_data, "student_grade", "intermediate"),
            learning_style: str_field(path_data, "learning_style", "visual"),
            strengths: string_list(path_data.get("strengths")),
            areas_for_improvement: string_list(path_data.get("weaknesses")),
        }
    }
}

fn str_field(value: &JsonValue, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or(default)
        .to_string()
}

fn string_list(value: Option<&JsonValue>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
