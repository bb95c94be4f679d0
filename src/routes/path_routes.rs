use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::dto::path_dto::{GenerateLearningPathPayload, LearningPathQuery};
use crate::error::Result;
use crate::models::diagnostic::DiagnosticResponse;
use crate::services::metrics_service::MetricsAnalyzer;
use crate::AppState;

#[axum::debug_handler]
pub async fn generate_learning_path(
    State(state): State<AppState>,
    Json(payload): Json<GenerateLearningPathPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let user = state.path_service.find_user(payload.user_id).await?;
    tracing::info!(user_id = %user.id, responses = payload.responses.len(), "generating learning path");

    let responses: Vec<DiagnosticResponse> = payload
        .responses
        .into_iter()
        .map(|r| DiagnosticResponse {
            question: r.question,
            answer: r.answer,
        })
        .collect();
    let questions = MetricsAnalyzer::classify_responses(&responses);

    let student_info = json!({
        "user_id": user.id,
        "username": user.username,
    });

    let plan = state
        .pipeline_service
        .generate(&student_info, &questions)
        .await?;
    let path = state.path_service.create(user.id, &plan).await?;

    let response = json!({
        "message": "Learning path generated successfully",
        "learning_path": path.path_data,
        "id": path.id,
        "created_at": path.created_at,
        "user_id": path.student_id,
    });
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn list_learning_paths(
    State(state): State<AppState>,
    Query(query): Query<LearningPathQuery>,
) -> Result<impl IntoResponse> {
    let user = state.path_service.find_user(query.user_id).await?;
    let paths = state.path_service.list_for_student(user.id).await?;
    Ok(Json(paths))
}
