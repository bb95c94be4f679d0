use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DiagnosticAnswerPayload {
    #[validate(length(min = 1))]
    pub question: String,
    #[validate(length(min = 1))]
    pub answer: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateLearningPathPayload {
    pub user_id: Uuid,
    #[validate(length(min = 1), nested)]
    pub responses: Vec<DiagnosticAnswerPayload>,
}

#[derive(Debug, Deserialize)]
pub struct LearningPathQuery {
    pub user_id: Uuid,
}
