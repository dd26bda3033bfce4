use crate::services::finder::FinderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failures, one variant per user-facing category. Unresolvable
/// path segments carry a safe-view redirect hint so clients never render a
/// partial page for them.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Branch not found")]
    BranchNotFound,
    #[error("Semester not found")]
    SemesterNotFound,
    #[error("Exam type not found")]
    ExamTypeNotFound,
    #[error("Paper not found")]
    PaperNotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("Query failed")]
    Upstream(#[source] anyhow::Error),
}

impl From<FinderError> for ApiError {
    fn from(err: FinderError) -> Self {
        match err {
            FinderError::BranchNotFound => ApiError::BranchNotFound,
            FinderError::SemesterNotFound => ApiError::SemesterNotFound,
            FinderError::ExamTypeNotFound => ApiError::ExamTypeNotFound,
            FinderError::Query(e) => ApiError::Upstream(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, redirect) = match &self {
            ApiError::BranchNotFound
            | ApiError::SemesterNotFound
            | ApiError::ExamTypeNotFound => (StatusCode::NOT_FOUND, Some("/")),
            ApiError::PaperNotFound => (StatusCode::NOT_FOUND, None),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::Upstream(e) => {
                error!("Upstream query failed: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let mut body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        if let Some(redirect) = redirect {
            body["redirect"] = json!(redirect);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_branch_maps_to_404_with_redirect() {
        let response = ApiError::BranchNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_finder_error_categories_stay_distinct() {
        assert!(matches!(
            ApiError::from(FinderError::BranchNotFound),
            ApiError::BranchNotFound
        ));
        assert!(matches!(
            ApiError::from(FinderError::ExamTypeNotFound),
            ApiError::ExamTypeNotFound
        ));
        assert!(matches!(
            ApiError::from(FinderError::Query(anyhow::anyhow!("boom"))),
            ApiError::Upstream(_)
        ));
    }
}
