use crate::error::{Error, Result};
use crate::models::learning_path::LearningPath;
use crate::models::user::User;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PathService {
    pool: PgPool,
}

impl PathService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_user(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    pub async fn create(&self, student_id: Uuid, path_data: &JsonValue) -> Result<LearningPath> {
        let path = sqlx::query_as::<_, LearningPath>(
            r#"
            INSERT INTO learning_paths (student_id, path_data)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(path_data)
        .fetch_one(&self.pool)
        .await?;

        Ok(path)
    }

    pub async fn find(&self, id: Uuid) -> Result<LearningPath> {
        let path = sqlx::query_as::<_, LearningPath>(r#"SELECT * FROM learning_paths WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Learning path not found".to_string()))?;

        Ok(path)
    }

    pub async fn list_for_student(&self, student_id: Uuid) -> Result<Vec<LearningPath>> {
        let paths = sqlx::query_as::<_, LearningPath>(
            r#"
            SELECT * FROM learning_paths
            WHERE student_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(paths)
    }
}
