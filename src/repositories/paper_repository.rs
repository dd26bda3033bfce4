use crate::models::{Paper, PaperDetails};
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

// Shared joined projection. Inner joins drop rows with dangling references,
// so they never reach a result set.
const DETAILS_SELECT: &str = "SELECT p.id, p.branch_id, p.semester_id, p.exam_type_id, \
     p.year, p.subject_name, p.file_url, p.created_at, p.deleted_at, \
     b.name AS branch_name, b.code AS branch_code, \
     s.number AS semester_number, \
     e.name AS exam_type_name, e.code AS exam_type_code \
     FROM papers p \
     JOIN branches b ON b.id = p.branch_id \
     JOIN semesters s ON s.id = p.semester_id \
     JOIN exam_types e ON e.id = p.exam_type_id";

pub struct PaperRepository {
    pool: PgPool,
}

impl PaperRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_paper(&self, paper: &Paper) -> Result<Paper> {
        let result = sqlx::query_as::<_, Paper>(
            "INSERT INTO papers (id, branch_id, semester_id, exam_type_id, year, subject_name, file_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, branch_id, semester_id, exam_type_id, year, subject_name, file_url, created_at, deleted_at"
        )
        .bind(paper.id)
        .bind(paper.branch_id)
        .bind(paper.semester_id)
        .bind(paper.exam_type_id)
        .bind(paper.year)
        .bind(&paper.subject_name)
        .bind(&paper.file_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn get_paper(&self, id: Uuid) -> Result<Option<Paper>> {
        let paper = sqlx::query_as::<_, Paper>(
            "SELECT id, branch_id, semester_id, exam_type_id, year, subject_name, file_url, created_at, deleted_at \
             FROM papers WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(paper)
    }

    pub async fn get_details(&self, id: Uuid) -> Result<Option<PaperDetails>> {
        let query = format!("{DETAILS_SELECT} WHERE p.id = $1");
        let details = sqlx::query_as::<_, PaperDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(details)
    }

    /// Live rows whose subject matches any of the patterns or whose branch is
    /// among the candidates, newest first.
    pub async fn search_live(
        &self,
        subject_patterns: &[String],
        branch_ids: &[Uuid],
    ) -> Result<Vec<PaperDetails>> {
        let query = format!(
            "{DETAILS_SELECT} \
             WHERE p.deleted_at IS NULL \
             AND (p.subject_name ILIKE ANY($1::text[]) OR p.branch_id = ANY($2::uuid[])) \
             ORDER BY p.created_at DESC"
        );
        let papers = sqlx::query_as::<_, PaperDetails>(&query)
            .bind(subject_patterns)
            .bind(branch_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(papers)
    }

    /// Live rows for a resolved hierarchy position, newest first.
    pub async fn lookup_live(
        &self,
        branch_id: Uuid,
        semester_id: Uuid,
        exam_type_id: Option<Uuid>,
        year: i32,
    ) -> Result<Vec<PaperDetails>> {
        let papers = match exam_type_id {
            Some(exam_type_id) => {
                let query = format!(
                    "{DETAILS_SELECT} \
                     WHERE p.deleted_at IS NULL \
                     AND p.branch_id = $1 AND p.semester_id = $2 \
                     AND p.exam_type_id = $3 AND p.year = $4 \
                     ORDER BY p.created_at DESC"
                );
                sqlx::query_as::<_, PaperDetails>(&query)
                    .bind(branch_id)
                    .bind(semester_id)
                    .bind(exam_type_id)
                    .bind(year)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "{DETAILS_SELECT} \
                     WHERE p.deleted_at IS NULL \
                     AND p.branch_id = $1 AND p.semester_id = $2 AND p.year = $3 \
                     ORDER BY p.created_at DESC"
                );
                sqlx::query_as::<_, PaperDetails>(&query)
                    .bind(branch_id)
                    .bind(semester_id)
                    .bind(year)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(papers)
    }

    pub async fn list_all(&self, include_deleted: bool) -> Result<Vec<PaperDetails>> {
        let query = if include_deleted {
            format!("{DETAILS_SELECT} ORDER BY p.created_at DESC")
        } else {
            format!("{DETAILS_SELECT} WHERE p.deleted_at IS NULL ORDER BY p.created_at DESC")
        };
        let papers = sqlx::query_as::<_, PaperDetails>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(papers)
    }

    pub async fn update_paper(
        &self,
        id: Uuid,
        branch_id: Option<Uuid>,
        semester_id: Option<Uuid>,
        exam_type_id: Option<Uuid>,
        year: Option<i32>,
        subject_name: Option<Option<String>>,
        file_url: Option<String>,
    ) -> Result<Paper> {
        let existing = self
            .get_paper(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Paper not found"))?;

        let updated = sqlx::query_as::<_, Paper>(
            "UPDATE papers SET branch_id = $2, semester_id = $3, exam_type_id = $4, \
             year = $5, subject_name = $6, file_url = $7 \
             WHERE id = $1 \
             RETURNING id, branch_id, semester_id, exam_type_id, year, subject_name, file_url, created_at, deleted_at"
        )
        .bind(id)
        .bind(branch_id.unwrap_or(existing.branch_id))
        .bind(semester_id.unwrap_or(existing.semester_id))
        .bind(exam_type_id.unwrap_or(existing.exam_type_id))
        .bind(year.unwrap_or(existing.year))
        .bind(subject_name.unwrap_or(existing.subject_name))
        .bind(file_url.unwrap_or(existing.file_url))
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn set_file_url(&self, id: Uuid, file_url: &str) -> Result<Paper> {
        let updated = sqlx::query_as::<_, Paper>(
            "UPDATE papers SET file_url = $2 WHERE id = $1 \
             RETURNING id, branch_id, semester_id, exam_type_id, year, subject_name, file_url, created_at, deleted_at"
        )
        .bind(id)
        .bind(file_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE papers SET deleted_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn restore(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE papers SET deleted_at = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_paper(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM papers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get_paper_stats(&self) -> Result<PaperStats> {
        let total_papers = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM papers")
            .fetch_one(&self.pool)
            .await?;

        let live_papers =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM papers WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        let recent_uploads = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM papers WHERE created_at >= NOW() - INTERVAL '30 days'",
        )
        .fetch_one(&self.pool)
        .await?;

        let papers_by_branch = sqlx::query_as::<_, BranchCount>(
            "SELECT b.name AS branch_name, COUNT(p.id) AS paper_count \
             FROM branches b \
             LEFT JOIN papers p ON p.branch_id = b.id AND p.deleted_at IS NULL \
             GROUP BY b.name ORDER BY paper_count DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(PaperStats {
            total_papers,
            live_papers,
            deleted_papers: total_papers - live_papers,
            recent_uploads,
            papers_by_branch,
        })
    }
}

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct BranchCount {
    pub branch_name: String,
    pub paper_count: i64,
}

#[derive(Debug, serde::Serialize)]
pub struct PaperStats {
    pub total_papers: i64,
    pub live_papers: i64,
    pub deleted_papers: i64,
    pub recent_uploads: i64,
    pub papers_by_branch: Vec<BranchCount>,
}
