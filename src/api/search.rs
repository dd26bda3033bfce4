use crate::api::errors::ApiError;
use crate::auth::extractors::AppState;
use crate::models::PaperDetails;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub q: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<PaperDetails>,
    pub total: usize,
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new().route("/", get(search_papers));

    Ok(router)
}

/// Free-text paper search. An absent, empty, or whitespace-only query clears
/// the result set rather than erroring.
async fn search_papers(
    State(app_state): State<AppState>,
    Query(params): Query<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    tracing::debug!("Search request params: {:?}", params);

    // Accept the query from either 'q' or 'query'
    let raw_query = params.q.or(params.query).unwrap_or_default();

    let results = app_state.finder.search(&raw_query).await?;

    Ok(Json(SearchResponse {
        total: results.len(),
        results,
    }))
}
