use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value as JsonValue};

use crate::dto::task_dto::{CreateTasksPayload, StudentTaskQuery};
use crate::error::{Error, Result};
use crate::AppState;

#[axum::debug_handler]
pub async fn create_tasks(
    State(state): State<AppState>,
    Json(payload): Json<CreateTasksPayload>,
) -> Result<impl IntoResponse> {
    let path = state.path_service.find(payload.learning_path_id).await?;
    let student = state.path_service.find_user(payload.student_id).await?;
    tracing::info!(
        learning_path_id = %path.id,
        student_id = %student.id,
        "generating tasks for learning path"
    );

    let generated = state
        .task_generation_service
        .generate_from_path(&path.path_data)
        .await;
    if generated.is_empty() {
        return Err(Error::Internal(
            "No tasks could be generated from the learning path".to_string(),
        ));
    }

    let created = state
        .task_service
        .create_for_student(
            student.id,
            path.id,
            &generated,
            state.config.tasks.default_due_days,
        )
        .await?;

    let tasks: Vec<JsonValue> = created
        .iter()
        .map(|(task, assignment)| {
            json!({
                "id": assignment.id,
                "task": task,
                "status": assignment.status,
                "due_date": assignment.due_date,
            })
        })
        .collect();

    let response = json!({
        "message": format!("Successfully created {} tasks", tasks.len()),
        "tasks": tasks,
    });
    Ok((StatusCode::CREATED, Json(response)))
}

#[axum::debug_handler]
pub async fn list_student_tasks(
    State(state): State<AppState>,
    Query(query): Query<StudentTaskQuery>,
) -> Result<impl IntoResponse> {
    let student = state.path_service.find_user(query.student_id).await?;
    let assignments = state
        .task_service
        .list_for_student(student.id, query.learning_path_id)
        .await?;
    Ok(Json(json!({ "tasks": assignments })))
}
