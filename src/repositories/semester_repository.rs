use crate::models::Semester;
use anyhow::Result;
use sqlx::PgPool;

pub struct SemesterRepository {
    pool: PgPool,
}

impl SemesterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_semesters(&self) -> Result<Vec<Semester>> {
        let semesters = sqlx::query_as::<_, Semester>(
            "SELECT id, number FROM semesters ORDER BY number",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(semesters)
    }

    pub async fn find_by_number(&self, number: i32) -> Result<Option<Semester>> {
        let semester = sqlx::query_as::<_, Semester>(
            "SELECT id, number FROM semesters WHERE number = $1",
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(semester)
    }
}
