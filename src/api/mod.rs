pub mod admin;
pub mod auth;
pub mod branches;
pub mod catalog;
pub mod errors;
pub mod papers;
pub mod search;

use crate::auth::extractors::AppState;
use anyhow::Result;
use axum::{routing::get, Router};

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/status", get(status_handler))
        .nest("/auth", auth::create_router().await?)
        .nest("/branches", branches::create_router().await?)
        .merge(catalog::create_router().await?)
        .nest("/papers", papers::create_router().await?)
        .nest("/search", search::create_router().await?)
        .nest("/admin", admin::create_router().await?);

    Ok(router)
}

async fn status_handler() -> &'static str {
    "API is running"
}
