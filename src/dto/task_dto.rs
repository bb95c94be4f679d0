use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateTasksPayload {
    pub learning_path_id: Uuid,
    pub student_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StudentTaskQuery {
    pub student_id: Uuid,
    pub learning_path_id: Option<Uuid>,
}
