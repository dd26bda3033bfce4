use crate::models::ExamType;
use anyhow::Result;
use sqlx::PgPool;

pub struct ExamTypeRepository {
    pool: PgPool,
}

impl ExamTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_exam_types(&self) -> Result<Vec<ExamType>> {
        let exam_types = sqlx::query_as::<_, ExamType>(
            "SELECT id, name, code FROM exam_types ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(exam_types)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<ExamType>> {
        let exam_type = sqlx::query_as::<_, ExamType>(
            "SELECT id, name, code FROM exam_types WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exam_type)
    }
}
