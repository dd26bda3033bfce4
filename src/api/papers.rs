use crate::api::errors::ApiError;
use crate::auth::extractors::AppState;
use crate::models::PaperDetails;
use crate::services::finder::LookupRequest;
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PaperQueryParams {
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub semester: Option<i32>,
    pub exam_type: Option<String>,
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/", get(list_papers))
        .route("/{id}", get(get_paper));

    Ok(router)
}

/// Hierarchical lookup: branch code, year, and semester number are required
/// path parameters, exam type is optional. Every emitted row passed the
/// existence check.
async fn list_papers(
    State(app_state): State<AppState>,
    Query(params): Query<PaperQueryParams>,
) -> Result<Json<Vec<PaperDetails>>, ApiError> {
    let branch_code = params
        .branch
        .ok_or_else(|| ApiError::BadRequest("branch is required".to_string()))?;
    let year = params
        .year
        .ok_or_else(|| ApiError::BadRequest("year is required".to_string()))?;
    let semester_number = params
        .semester
        .ok_or_else(|| ApiError::BadRequest("semester is required".to_string()))?;

    let request = LookupRequest {
        branch_code,
        year,
        semester_number,
        exam_type_code: params.exam_type,
    };

    let papers = app_state.finder.lookup(&request).await?;

    Ok(Json(papers))
}

async fn get_paper(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaperDetails>, ApiError> {
    let paper = app_state.finder.find_live(id).await?;

    paper.map(Json).ok_or(ApiError::PaperNotFound)
}
