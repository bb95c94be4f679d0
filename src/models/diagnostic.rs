use serde::{Deserialize, Serialize};

/// One diagnostic quiz answer as submitted by the student. An answer counts
/// as correct when it equals "correct" case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResponse {
    pub question: String,
    pub answer: String,
}

impl DiagnosticResponse {
    pub fn is_correct(&self) -> bool {
        self.answer.to_lowercase() == "correct"
    }
}

/// A response after subject classification, the shape embedded in the
/// analysis prompt and consumed by the metrics step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedQuestion {
    pub question_text: String,
    pub correct: bool,
    pub subject: Subject,
}

/// Subjects diagnostic questions are classified into. `General` is the
/// classification default and never contributes to metrics.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Subject {
    Math,
    Reading,
    Science,
    Language,
    General,
}

/// The fixed subjects metrics are reported for, in declared order.
pub const METRIC_SUBJECTS: [Subject; 4] = [
    Subject::Math,
    Subject::Reading,
    Subject::Science,
    Subject::Language,
];

impl Subject {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Reading => "Reading",
            Subject::Science => "Science",
            Subject::Language => "Language",
            Subject::General => "General",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectMetric {
    pub correct: u32,
    pub total: u32,
    pub percentage: f64,
}

impl SubjectMetric {
    pub fn zero() -> Self {
        Self {
            correct: 0,
            total: 0,
            percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifficultyTier {
    Basic,
    Intermediate,
    Advanced,
}

impl DifficultyTier {
    /// >= 80 Advanced, >= 60 Intermediate, else Basic.
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            DifficultyTier::Advanced
        } else if percentage >= 60.0 {
            DifficultyTier::Intermediate
        } else {
            DifficultyTier::Basic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Basic => "Basic",
            DifficultyTier::Intermediate => "Intermediate",
            DifficultyTier::Advanced => "Advanced",
        }
    }
}
