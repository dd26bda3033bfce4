use crate::api::errors::ApiError;
use crate::auth::extractors::AppState;
use crate::models::{ExamType, Semester};
use crate::repositories::{ExamTypeRepository, SemesterRepository};
use anyhow::Result;
use axum::{extract::State, response::Json, routing::get, Router};

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/semesters", get(list_semesters))
        .route("/exam-types", get(list_exam_types));

    Ok(router)
}

async fn list_semesters(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Semester>>, ApiError> {
    let semesters = SemesterRepository::new(app_state.database.pool().clone())
        .list_semesters()
        .await
        .map_err(ApiError::Upstream)?;

    Ok(Json(semesters))
}

async fn list_exam_types(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ExamType>>, ApiError> {
    let exam_types = ExamTypeRepository::new(app_state.database.pool().clone())
        .list_exam_types()
        .await
        .map_err(ApiError::Upstream)?;

    Ok(Json(exam_types))
}
