use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub task_type: String,
    pub learning_objective: String,
    pub difficulty: String,
    pub content: JsonValue,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentTask {
    pub id: Uuid,
    pub student_id: Uuid,
    pub task_id: Uuid,
    pub learning_path_id: Uuid,
    pub status: String,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Quiz,
    Assignment,
    Interactive,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Quiz => "quiz",
            TaskType::Assignment => "assignment",
            TaskType::Interactive => "interactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "quiz" => Some(TaskType::Quiz),
            "assignment" => Some(TaskType::Assignment),
            "interactive" => Some(TaskType::Interactive),
            _ => None,
        }
    }

    /// Content key a task of this type is rendered from.
    pub fn content_key(&self) -> &'static str {
        match self {
            TaskType::Quiz => "questions",
            TaskType::Assignment => "instructions",
            TaskType::Interactive => "activity_type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Total map: tier labels fold onto task difficulties, canonical values
    /// pass through, anything else lands on Medium.
    pub fn normalize(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "basic" | "easy" => Difficulty::Easy,
            "intermediate" | "medium" => Difficulty::Medium,
            "advanced" | "hard" => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A task document as produced by either synthesis strategy, before
/// persistence attaches status and due date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub title: String,
    pub task_type: TaskType,
    pub difficulty: Difficulty,
    pub learning_objective: String,
    pub content: JsonValue,
}

impl GeneratedTask {
    pub fn content_matches_type(&self) -> bool {
        self.content.get(self.task_type.content_key()).is_some()
    }
}
