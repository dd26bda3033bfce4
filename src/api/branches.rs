use crate::api::errors::ApiError;
use crate::auth::extractors::AppState;
use crate::models::Branch;
use crate::repositories::BranchRepository;
use anyhow::Result;
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use backoff::{future::retry, Error as BackoffError, ExponentialBackoffBuilder};
use std::time::Duration;

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/", get(list_branches))
        .route("/{code}", get(get_branch));

    Ok(router)
}

async fn list_branches(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Branch>>, ApiError> {
    let branches = BranchRepository::new(app_state.database.pool().clone())
        .list_branches()
        .await
        .map_err(ApiError::Upstream)?;

    Ok(Json(branches))
}

/// Branch detail. Transient store failures are retried with bounded
/// exponential backoff; an unknown code is an input error, not a retry case.
async fn get_branch(
    State(app_state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Branch>, ApiError> {
    let pool = app_state.database.pool().clone();
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(100))
        .with_max_elapsed_time(Some(Duration::from_secs(2)))
        .build();

    let branch = retry(policy, || {
        let repo = BranchRepository::new(pool.clone());
        let code = code.clone();
        async move { repo.find_by_code(&code).await.map_err(BackoffError::transient) }
    })
    .await
    .map_err(ApiError::Upstream)?;

    branch.map(Json).ok_or(ApiError::BranchNotFound)
}
