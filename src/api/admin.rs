use crate::api::errors::ApiError;
use crate::auth::extractors::{AdminUser, AppState};
use crate::models::{Paper, PaperDetails};
use crate::repositories::paper_repository::{PaperRepository, PaperStats};
use crate::services::reference::FileReference;
use crate::services::storage::unique_object_name;
use anyhow::Result;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    pub include_deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// "soft" (default) sets the delete timestamp; "hard" removes the row
    /// and the stored file.
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaperRequest {
    pub branch_id: Option<Uuid>,
    pub semester_id: Option<Uuid>,
    pub exam_type_id: Option<Uuid>,
    pub year: Option<i32>,
    /// An absent field leaves the subject unchanged; an explicit null
    /// clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub subject_name: Option<Option<String>>,
    pub file_url: Option<String>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub uptime_seconds: u64,
    pub papers: PaperStats,
}

pub async fn create_router() -> Result<Router<AppState>> {
    let router = Router::new()
        .route("/papers", get(list_papers).post(upload_paper))
        .route("/papers/{id}", put(update_paper).delete(delete_paper))
        .route("/papers/{id}/file", post(replace_file))
        .route("/papers/{id}/restore", post(restore_paper))
        .route("/stats", get(get_stats));

    Ok(router)
}

/// Dashboard listing, newest first. This is the only read surface that can
/// reach soft-deleted rows, and it skips existence checks so an admin can
/// see records whose file has gone missing.
async fn list_papers(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Vec<PaperDetails>>, ApiError> {
    let papers = PaperRepository::new(app_state.database.pool().clone())
        .list_all(params.include_deleted.unwrap_or(false))
        .await
        .map_err(ApiError::Upstream)?;

    Ok(Json(papers))
}

async fn get_stats(
    State(app_state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<AdminStats>, ApiError> {
    let papers = PaperRepository::new(app_state.database.pool().clone())
        .get_paper_stats()
        .await
        .map_err(ApiError::Upstream)?;

    Ok(Json(AdminStats {
        uptime_seconds: app_state.startup_time.elapsed().as_secs(),
        papers,
    }))
}

/// Multipart upload. The file is placed in storage first; the row is only
/// inserted once the object exists. An external link may be supplied instead
/// of a file, but it must parse as an allowed reference.
async fn upload_paper(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    mut multipart: Multipart,
) -> Result<Json<Paper>, ApiError> {
    let mut branch_id = None;
    let mut semester_id = None;
    let mut exam_type_id = None;
    let mut year = None;
    let mut subject_name = None;
    let mut external_url = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "branch_id" => branch_id = Some(parse_uuid_field("branch_id", &field_text(field).await?)?),
            "semester_id" => {
                semester_id = Some(parse_uuid_field("semester_id", &field_text(field).await?)?)
            }
            "exam_type_id" => {
                exam_type_id = Some(parse_uuid_field("exam_type_id", &field_text(field).await?)?)
            }
            "year" => {
                year = Some(field_text(field).await?.trim().parse::<i32>().map_err(|_| {
                    ApiError::BadRequest("year must be an integer".to_string())
                })?)
            }
            "subject_name" => {
                let text = field_text(field).await?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    subject_name = Some(trimmed.to_string());
                }
            }
            "file_url" => external_url = Some(field_text(field).await?),
            "file" => {
                let file_name = field.file_name().unwrap_or("paper.pdf").to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?.to_vec();
                file = Some((file_name, bytes));
            }
            _ => {}
        }
    }

    let branch_id = require(branch_id, "branch_id")?;
    let semester_id = require(semester_id, "semester_id")?;
    let exam_type_id = require(exam_type_id, "exam_type_id")?;
    let year = require(year, "year")?;

    let file_url = match (file, external_url) {
        (Some((file_name, bytes)), _) => {
            let object_name = unique_object_name(&file_name);
            let content_type = mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string();
            app_state
                .storage
                .upload(&object_name, &content_type, bytes)
                .await
                .map_err(ApiError::Upstream)?;
            app_state.storage.public_url(&object_name)
        }
        (None, Some(url)) => validated_external_url(&app_state, url)?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Either a file or a file_url is required".to_string(),
            ))
        }
    };

    let paper = Paper {
        id: Uuid::new_v4(),
        branch_id,
        semester_id,
        exam_type_id,
        year,
        subject_name,
        file_url,
        created_at: chrono::Utc::now(),
        deleted_at: None,
    };

    let created = PaperRepository::new(app_state.database.pool().clone())
        .create_paper(&paper)
        .await
        .map_err(ApiError::Upstream)?;

    info!("Paper {} uploaded by {}", created.id, admin.user.email);
    Ok(Json(created))
}

async fn update_paper(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePaperRequest>,
) -> Result<Json<Paper>, ApiError> {
    let repo = PaperRepository::new(app_state.database.pool().clone());

    if repo
        .get_paper(id)
        .await
        .map_err(ApiError::Upstream)?
        .is_none()
    {
        return Err(ApiError::PaperNotFound);
    }

    let file_url = match req.file_url {
        Some(url) => Some(validated_external_url(&app_state, url)?),
        None => None,
    };

    let updated = repo
        .update_paper(
            id,
            req.branch_id,
            req.semester_id,
            req.exam_type_id,
            req.year,
            req.subject_name,
            file_url,
        )
        .await
        .map_err(ApiError::Upstream)?;

    info!("Paper {} updated by {}", id, admin.user.email);
    Ok(Json(updated))
}

/// Replace the backing file. The row points at the new object before the old
/// one is removed, so a failed cleanup leaves a stale object, never a
/// dangling row.
async fn replace_file(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Paper>, ApiError> {
    let repo = PaperRepository::new(app_state.database.pool().clone());
    let existing = repo
        .get_paper(id)
        .await
        .map_err(ApiError::Upstream)?
        .ok_or(ApiError::PaperNotFound)?;

    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("paper.pdf").to_string();
            let bytes = field.bytes().await.map_err(bad_multipart)?.to_vec();
            file = Some((file_name, bytes));
        }
    }
    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("A file part is required".to_string()))?;

    let object_name = unique_object_name(&file_name);
    let content_type = mime_guess::from_path(&file_name)
        .first_or_octet_stream()
        .to_string();
    app_state
        .storage
        .upload(&object_name, &content_type, bytes)
        .await
        .map_err(ApiError::Upstream)?;

    let updated = repo
        .set_file_url(id, &app_state.storage.public_url(&object_name))
        .await
        .map_err(ApiError::Upstream)?;

    // Superseded object cleanup is best-effort
    if let FileReference::Stored { object_name: old } = parse_reference(&app_state, &existing.file_url) {
        if let Err(e) = app_state.storage.delete(&old).await {
            warn!("Failed to remove superseded object {}: {}", old, e);
        }
    }

    info!("Paper {} file replaced by {}", id, admin.user.email);
    Ok(Json(updated))
}

async fn delete_paper(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = PaperRepository::new(app_state.database.pool().clone());
    let existing = repo
        .get_paper(id)
        .await
        .map_err(ApiError::Upstream)?
        .ok_or(ApiError::PaperNotFound)?;

    let mode = params.mode.as_deref().unwrap_or("soft");
    match mode {
        "soft" => {
            repo.soft_delete(id).await.map_err(ApiError::Upstream)?;
            info!("Paper {} soft-deleted by {}", id, admin.user.email);
        }
        "hard" => {
            // A file that is already gone must not block removal of the row
            if let FileReference::Stored { object_name } =
                parse_reference(&app_state, &existing.file_url)
            {
                if let Err(e) = app_state.storage.delete(&object_name).await {
                    warn!("Failed to delete object {} for paper {}: {}", object_name, id, e);
                }
            }
            repo.delete_paper(id).await.map_err(ApiError::Upstream)?;
            info!("Paper {} hard-deleted by {}", id, admin.user.email);
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown delete mode '{other}', expected 'soft' or 'hard'"
            )))
        }
    }

    Ok(Json(json!({ "id": id, "mode": mode })))
}

async fn restore_paper(
    State(app_state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Paper>, ApiError> {
    let repo = PaperRepository::new(app_state.database.pool().clone());
    if repo
        .get_paper(id)
        .await
        .map_err(ApiError::Upstream)?
        .is_none()
    {
        return Err(ApiError::PaperNotFound);
    }

    repo.restore(id).await.map_err(ApiError::Upstream)?;
    let restored = repo
        .get_paper(id)
        .await
        .map_err(ApiError::Upstream)?
        .ok_or(ApiError::PaperNotFound)?;

    info!("Paper {} restored by {}", id, admin.user.email);
    Ok(Json(restored))
}

fn parse_reference(app_state: &AppState, file_url: &str) -> FileReference {
    FileReference::parse(
        file_url,
        &app_state.storage.public_prefix(),
        &app_state.config.storage.allowed_external_hosts,
    )
}

fn validated_external_url(app_state: &AppState, url: String) -> Result<String, ApiError> {
    match parse_reference(app_state, &url) {
        FileReference::Invalid => Err(ApiError::BadRequest(
            "file_url is not a stored object or an allowed external link".to_string(),
        )),
        _ => Ok(url),
    }
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart payload: {err}"))
}

async fn field_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field.text().await.map_err(bad_multipart)
}

fn parse_uuid_field(name: &str, value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| ApiError::BadRequest(format!("{name} must be a UUID")))
}

fn require<T>(value: Option<T>, name: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{name} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_subject_name_leaves_it_unchanged() {
        let req: UpdatePaperRequest = serde_json::from_value(json!({ "year": 2024 })).unwrap();
        assert_eq!(req.subject_name, None);
        assert_eq!(req.year, Some(2024));
    }

    #[test]
    fn test_null_subject_name_clears_it() {
        let req: UpdatePaperRequest =
            serde_json::from_value(json!({ "subject_name": null })).unwrap();
        assert_eq!(req.subject_name, Some(None));
    }

    #[test]
    fn test_present_subject_name_replaces_it() {
        let req: UpdatePaperRequest =
            serde_json::from_value(json!({ "subject_name": "Compilers" })).unwrap();
        assert_eq!(req.subject_name, Some(Some("Compilers".to_string())));
    }
}
