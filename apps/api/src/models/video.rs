use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A recorded video pitch attached to an application. Storage collaborator
/// only — the generation pipeline never reads these.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VideoRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub s3_key: String,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}
