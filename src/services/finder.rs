use crate::models::PaperDetails;
use crate::repositories::{
    BranchRepository, ExamTypeRepository, PaperRepository, SemesterRepository,
};
use crate::services::reference::{reference_is_live, FileReference};
use crate::services::storage::StorageClient;
use futures::stream::{self, StreamExt};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

// Existence checks are independent and read-only, so they run concurrently.
// Buffering keeps result order.
const VERIFY_CONCURRENCY: usize = 8;

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Branch not found")]
    BranchNotFound,
    #[error("Semester not found")]
    SemesterNotFound,
    #[error("Exam type not found")]
    ExamTypeNotFound,
    #[error("Query failed: {0}")]
    Query(#[from] anyhow::Error),
}

/// Hierarchical path segments: branch code, calendar year, semester number,
/// and optionally an exam type code.
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub branch_code: String,
    pub year: i32,
    pub semester_number: i32,
    pub exam_type_code: Option<String>,
}

/// Translates a search term or hierarchical path segments into a filtered,
/// existence-verified list of paper rows.
pub struct PaperFinder {
    pool: PgPool,
    storage: Arc<StorageClient>,
    allowed_hosts: Vec<String>,
}

impl PaperFinder {
    pub fn new(pool: PgPool, storage: Arc<StorageClient>, allowed_hosts: Vec<String>) -> Self {
        Self {
            pool,
            storage,
            allowed_hosts,
        }
    }

    /// Free-text search over subject names and branch names/codes.
    /// An empty or whitespace-only query clears the result set without
    /// touching the store.
    pub async fn search(&self, raw_query: &str) -> Result<Vec<PaperDetails>, FinderError> {
        let query = raw_query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let branch_ids = BranchRepository::new(self.pool.clone())
            .find_ids_matching(query)
            .await?;
        let patterns = subject_patterns(query);

        let rows = PaperRepository::new(self.pool.clone())
            .search_live(&patterns, &branch_ids)
            .await?;

        Ok(self.filter_live(rows).await)
    }

    /// Path-based lookup. Each unresolvable segment is its own error
    /// category, and any failed resolution aborts the whole lookup; a
    /// missing branch is an input error, never an empty result.
    pub async fn lookup(&self, request: &LookupRequest) -> Result<Vec<PaperDetails>, FinderError> {
        let branch = BranchRepository::new(self.pool.clone())
            .find_by_code(&request.branch_code)
            .await?
            .ok_or(FinderError::BranchNotFound)?;

        let semester = SemesterRepository::new(self.pool.clone())
            .find_by_number(request.semester_number)
            .await?
            .ok_or(FinderError::SemesterNotFound)?;

        let exam_type_id = match &request.exam_type_code {
            Some(code) => Some(
                ExamTypeRepository::new(self.pool.clone())
                    .find_by_code(code)
                    .await?
                    .ok_or(FinderError::ExamTypeNotFound)?
                    .id,
            ),
            None => None,
        };

        let rows = PaperRepository::new(self.pool.clone())
            .lookup_live(branch.id, semester.id, exam_type_id, request.year)
            .await?;

        Ok(self.filter_live(rows).await)
    }

    /// Single live paper by id. Soft-deleted rows and rows whose file is
    /// gone resolve to `None`.
    pub async fn find_live(&self, id: Uuid) -> Result<Option<PaperDetails>, FinderError> {
        let Some(row) = PaperRepository::new(self.pool.clone()).get_details(id).await? else {
            return Ok(None);
        };
        if row.deleted_at.is_some() {
            return Ok(None);
        }

        let prefix = self.storage.public_prefix();
        Ok(self.row_is_live(&prefix, &row).await.then_some(row))
    }

    /// Drop rows whose file reference is no longer retrievable, preserving
    /// input order. Individual check failures are absorbed silently.
    pub async fn filter_live(&self, rows: Vec<PaperDetails>) -> Vec<PaperDetails> {
        let prefix = self.storage.public_prefix();

        let checked: Vec<(PaperDetails, bool)> = stream::iter(rows.into_iter())
            .map(|row| {
                let prefix = prefix.clone();
                async move {
                    let live = self.row_is_live(&prefix, &row).await;
                    (row, live)
                }
            })
            .buffered(VERIFY_CONCURRENCY)
            .collect()
            .await;

        checked
            .into_iter()
            .filter(|(_, live)| *live)
            .map(|(row, _)| row)
            .collect()
    }

    async fn row_is_live(&self, storage_public_prefix: &str, row: &PaperDetails) -> bool {
        match FileReference::parse(&row.file_url, storage_public_prefix, &self.allowed_hosts) {
            FileReference::Stored { object_name } => {
                match self.storage.list(&object_name).await {
                    Ok(listing) => reference_is_live(
                        &FileReference::Stored { object_name },
                        &listing,
                    ),
                    Err(e) => {
                        debug!("Existence check failed for paper {}: {}", row.id, e);
                        false
                    }
                }
            }
            reference => reference_is_live(&reference, &[]),
        }
    }
}

/// One case-insensitive LIKE pattern per whitespace-separated token.
fn subject_patterns(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|token| format!("%{}%", token))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_patterns_tokenize_on_whitespace() {
        assert_eq!(
            subject_patterns("data  base\tsystems"),
            vec!["%data%", "%base%", "%systems%"]
        );
    }

    #[test]
    fn test_subject_patterns_single_token() {
        assert_eq!(subject_patterns("Data"), vec!["%Data%"]);
    }
}
