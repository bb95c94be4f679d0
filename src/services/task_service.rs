use crate::error::Result;
use crate::models::task::{GeneratedTask, StudentTask, Task};
use crate::utils::time;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a synthesized batch in one transaction: every task row and
    /// its student assignment land together or not at all.
    pub async fn create_for_student(
        &self,
        student_id: Uuid,
        learning_path_id: Uuid,
        generated: &[GeneratedTask],
        due_days: i64,
    ) -> Result<Vec<(Task, StudentTask)>> {
        let due_date = time::due_date(due_days);
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(generated.len());

        for task in generated {
            let stored = sqlx::query_as::<_, Task>(
                r#"
                INSERT INTO tasks (title, task_type, learning_objective, difficulty, content, status)
                VALUES ($1, $2, $3, $4, $5, 'active')
                RETURNING *
                "#,
            )
            .bind(&task.title)
            .bind(task.task_type.as_str())
            .bind(&task.learning_objective)
            .bind(task.difficulty.as_str())
            .bind(&task.content)
            .fetch_one(&mut *tx)
            .await?;

            let assignment = sqlx::query_as::<_, StudentTask>(
                r#"
                INSERT INTO student_tasks (student_id, task_id, learning_path_id, status, due_date)
                VALUES ($1, $2, $3, 'pending', $4)
                RETURNING *
                "#,
            )
            .bind(student_id)
            .bind(stored.id)
            .bind(learning_path_id)
            .bind(due_date)
            .fetch_one(&mut *tx)
            .await?;

            created.push((stored, assignment));
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn list_for_student(
        &self,
        student_id: Uuid,
        learning_path_id: Option<Uuid>,
    ) -> Result<Vec<StudentTask>> {
        let assignments = match learning_path_id {
            Some(path_id) => {
                sqlx::query_as::<_, StudentTask>(
                    r#"
                    SELECT * FROM student_tasks
                    WHERE student_id = $1 AND learning_path_id = $2
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(student_id)
                .bind(path_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, StudentTask>(
                    r#"
                    SELECT * FROM student_tasks
                    WHERE student_id = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(student_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(assignments)
    }
}
