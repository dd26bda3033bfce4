use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Paper {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub semester_id: Uuid,
    pub exam_type_id: Uuid,
    pub year: i32,
    pub subject_name: Option<String>,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A paper row joined with its reference tables for display. Rows whose
/// foreign keys no longer resolve never materialize as this type (inner joins).
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct PaperDetails {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub semester_id: Uuid,
    pub exam_type_id: Uuid,
    pub year: i32,
    pub subject_name: Option<String>,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    // Only the admin listing can carry a value here; public responses omit
    // the field entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub branch_name: String,
    pub branch_code: String,
    pub semester_number: i32,
    pub exam_type_name: String,
    pub exam_type_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(deleted_at: Option<DateTime<Utc>>) -> PaperDetails {
        PaperDetails {
            id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
            semester_id: Uuid::new_v4(),
            exam_type_id: Uuid::new_v4(),
            year: 2023,
            subject_name: Some("Database Systems".to_string()),
            file_url: "https://drive.google.com/file/d/xyz/view".to_string(),
            created_at: Utc::now(),
            deleted_at,
            branch_name: "Computer Science".to_string(),
            branch_code: "cse".to_string(),
            semester_number: 3,
            exam_type_name: "Mid Term 1".to_string(),
            exam_type_code: "mid1".to_string(),
        }
    }

    #[test]
    fn test_live_rows_serialize_without_deleted_at() {
        let value = serde_json::to_value(details(None)).unwrap();
        assert!(value.get("deleted_at").is_none());
    }

    #[test]
    fn test_deleted_rows_keep_the_timestamp() {
        let value = serde_json::to_value(details(Some(Utc::now()))).unwrap();
        assert!(value["deleted_at"].is_string());
    }
}
