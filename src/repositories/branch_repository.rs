use crate::models::Branch;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>> {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT id, name, code, created_at FROM branches ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(branches)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Branch>> {
        let branch = sqlx::query_as::<_, Branch>(
            "SELECT id, name, code, created_at FROM branches WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(branch)
    }

    /// Branch ids whose name or code partially matches the query,
    /// case-insensitively. Feeds the disjunctive search filter.
    pub async fn find_ids_matching(&self, query: &str) -> Result<Vec<Uuid>> {
        let pattern = format!("%{}%", query);
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM branches WHERE name ILIKE $1 OR code ILIKE $1",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
