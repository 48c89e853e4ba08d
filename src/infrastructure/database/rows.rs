use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Document row shared by every entity table: indexed columns for the
/// lookups the engine needs, full record as JSON in `data`. The columns are
/// authoritative for the sync metadata.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntityRow {
    pub id: String,
    pub owner_id: Option<String>,
    pub created_at: i64,
    pub sync_status: String,
    pub last_synced: Option<i64>,
    pub is_local: bool,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MutationRow {
    pub id: String,
    pub entity_table: String,
    pub action: String,
    pub payload: String,
    pub created_at: i64,
    pub retry_count: i32,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UploadBlobRow {
    pub id: String,
    pub owner_table: String,
    pub owner_id: String,
    pub content_base64: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UploadMetadataRow {
    pub id: String,
    pub owner_id: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub created_at: i64,
}
