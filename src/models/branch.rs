use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An academic department, e.g. Computer Science.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct Semester {
    pub id: Uuid,
    pub number: i32,
}

/// A category of assessment, e.g. midterm or final.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
pub struct ExamType {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}
